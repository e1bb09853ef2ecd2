//! The canonical class taxonomy and its one alias.
//!
//! The service may spell the middle class `Medium`; everything downstream of
//! ingestion sees `Mid`. Rendered badges may carry a `medium` style class in
//! reports produced by older renderers, which maps the same way.

use serde::{Deserialize, Serialize};
use std::fmt;

const MID_ALIAS: &str = "Medium";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    High,
    Mid,
    Low,
}

impl Level {
    /// Display and aggregation order.
    pub const ALL: [Level; 3] = [Level::High, Level::Mid, Level::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "High",
            Level::Mid => "Mid",
            Level::Low => "Low",
        }
    }

    /// Lowercased canonical name, used as the badge style suffix.
    pub fn style_class(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Mid => "mid",
            Level::Low => "low",
        }
    }

    /// Resolves a label as the service or simulator spells it.
    pub fn from_label(label: &str) -> Option<Level> {
        match canonical_key(label) {
            "High" => Some(Level::High),
            "Mid" => Some(Level::Mid),
            "Low" => Some(Level::Low),
            _ => None,
        }
    }

    /// Resolves a badge style suffix (`high`, `mid`, `low`, or `medium`).
    pub fn from_style_class(class: &str) -> Option<Level> {
        match class {
            "high" => Some(Level::High),
            "mid" => Some(Level::Mid),
            "low" => Some(Level::Low),
            c if c.eq_ignore_ascii_case(MID_ALIAS) => Some(Level::Mid),
            _ => None,
        }
    }

    /// Resolves a probability key regardless of case, as the bar segments
    /// carry it.
    pub fn from_probability_key(key: &str) -> Option<Level> {
        Level::from_style_class(&key.to_lowercase())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites `Medium` to `Mid`; every other key passes through untouched.
pub fn canonical_key(key: &str) -> &str {
    if key == MID_ALIAS {
        Level::Mid.as_str()
    } else {
        key
    }
}
