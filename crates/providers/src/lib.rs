//! Provider abstractions for pronunciation classification.
//!
//! A provider turns a batch of audio files into raw per-file results as the
//! classification service reports them. Labels are left exactly as received;
//! canonicalization happens downstream.

use bytes::Bytes;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub mod remote;
pub mod simulator;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("service reported an error: {0}")]
    ServerReported(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// An uploaded audio file: a name plus its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub name: String,
    pub data: Bytes,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

/// Class label to probability, in the order the source produced them.
///
/// Values are kept as given: nothing checks that they lie in `[0, 1]` or sum
/// to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probabilities(Vec<(String, f64)>);

impl Probabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its original position when it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Probabilities {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut probs = Probabilities::new();
        for (k, v) in iter {
            probs.insert(k, v);
        }
        probs
    }
}

impl Serialize for Probabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Probabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProbabilitiesVisitor;

        impl<'de> Visitor<'de> for ProbabilitiesVisitor {
            type Value = Probabilities;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of class label to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut probs = Probabilities::new();
                while let Some((key, value)) = access.next_entry::<String, f64>()? {
                    probs.insert(key, value);
                }
                Ok(probs)
            }
        }

        deserializer.deserialize_map(ProbabilitiesVisitor)
    }
}

/// One entry of the service's `results` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub file_name: String,
    pub predicted_class: String,
    pub probabilities: Probabilities,
}

#[async_trait::async_trait]
pub trait ClassificationProvider: Send + Sync {
    async fn classify(&self, files: &[AudioFile]) -> Result<Vec<RawResult>, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    classifiers: HashMap<String, Arc<dyn ClassificationProvider>>,
    pub preferred: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(
        mut self,
        name: &str,
        provider: Arc<dyn ClassificationProvider>,
    ) -> Self {
        self.classifiers.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn classifier(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn ClassificationProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no classification provider configured".into())
            })?;
        self.classifiers
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }
}
