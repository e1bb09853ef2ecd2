use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Display language for banners, the report header and summary labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Th,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Th => "th",
            Language::En => "en",
        }
    }

    /// Picks the Thai or English variant of a message.
    pub fn pick<'a>(self, th: &'a str, en: &'a str) -> &'a str {
        match self {
            Language::Th => th,
            Language::En => en,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "th" => Ok(Language::Th),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}
