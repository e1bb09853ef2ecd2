use crate::config::AppConfig;
use crate::error::AssessmentError;
use crate::models::ClassificationResult;
use crate::normalizer;
use providers::remote::{RemoteClassifier, RemoteConfig};
use providers::simulator::Simulator;
use providers::{AudioFile, ClassificationProvider, ProviderRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Sends a batch to the configured provider and canonicalizes what comes back.
///
/// With `dev_fallback` set, a failed call is answered by the simulator
/// instead. Without it, the provider's error reaches the caller unchanged.
pub struct ClassificationClient {
    provider: Arc<dyn ClassificationProvider>,
    simulator: Arc<Simulator>,
    dev_fallback: bool,
}

impl ClassificationClient {
    pub fn new(
        provider: Arc<dyn ClassificationProvider>,
        simulator: Arc<Simulator>,
        dev_fallback: bool,
    ) -> Self {
        Self {
            provider,
            simulator,
            dev_fallback,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, AssessmentError> {
        let simulator = Arc::new(build_simulator(cfg));
        let registry = build_registry(cfg, simulator.clone());
        let provider = registry.classifier(None)?;
        Ok(Self::new(provider, simulator, cfg.service.dev_fallback))
    }

    pub async fn classify(
        &self,
        files: &[AudioFile],
    ) -> Result<Vec<ClassificationResult>, AssessmentError> {
        let raw = match self.provider.classify(files).await {
            Ok(raw) => raw,
            Err(err) if self.dev_fallback => {
                warn!(error = %err, "classification service unavailable, using simulated results");
                self.simulator.generate(files)
            }
            Err(err) => return Err(err.into()),
        };
        info!(results = raw.len(), "classification complete");
        normalizer::normalize_all(raw)
    }
}

pub fn build_simulator(cfg: &AppConfig) -> Simulator {
    match cfg.simulator.seed {
        Some(seed) => Simulator::seeded(seed),
        None => Simulator::new(),
    }
}

pub fn build_registry(cfg: &AppConfig, simulator: Arc<Simulator>) -> ProviderRegistry {
    let remote = RemoteClassifier::new(RemoteConfig {
        base_url: cfg.service.base_url.clone(),
        endpoint: cfg.service.endpoint.clone(),
        field_name: cfg.service.field_name.clone(),
    });
    ProviderRegistry::new()
        .with_classifier("remote", Arc::new(remote))
        .with_classifier("simulated", simulator)
        .set_preferred(&cfg.service.provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Level;
    use providers::{ProviderError, RawResult};

    struct Unreachable;

    #[async_trait::async_trait]
    impl ClassificationProvider for Unreachable {
        async fn classify(&self, _files: &[AudioFile]) -> Result<Vec<RawResult>, ProviderError> {
            Err(ProviderError::RequestFailed("connection refused".into()))
        }
    }

    struct Fixed(Vec<RawResult>);

    #[async_trait::async_trait]
    impl ClassificationProvider for Fixed {
        async fn classify(&self, _files: &[AudioFile]) -> Result<Vec<RawResult>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    fn files() -> Vec<AudioFile> {
        vec![
            AudioFile::new("a.wav", Vec::new()),
            AudioFile::new("b.wav", Vec::new()),
        ]
    }

    #[tokio::test]
    async fn fallback_only_when_enabled() {
        let sim = Arc::new(Simulator::seeded(5));

        let dev = ClassificationClient::new(Arc::new(Unreachable), sim.clone(), true);
        let results = dev.classify(&files()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].file_name, "b.wav");

        let prod = ClassificationClient::new(Arc::new(Unreachable), sim, false);
        let err = prod.classify(&files()).await.unwrap_err();
        assert!(matches!(err, AssessmentError::Transport(msg) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn results_are_canonicalized_once_at_ingestion() {
        let raw = RawResult {
            file_name: "a.wav".into(),
            predicted_class: "Medium".into(),
            probabilities: [("High", 0.1), ("Medium", 0.8), ("Low", 0.1)]
                .into_iter()
                .collect(),
        };
        let client = ClassificationClient::new(
            Arc::new(Fixed(vec![raw])),
            Arc::new(Simulator::seeded(1)),
            false,
        );
        let results = client.classify(&files()[..1]).await.unwrap();
        assert_eq!(results[0].predicted_class, Level::Mid);
        assert_eq!(results[0].probabilities.get("Mid"), Some(0.8));
        assert_eq!(results[0].probabilities.get("Medium"), None);
    }

    #[test]
    fn simulated_provider_can_be_preferred() {
        let mut cfg = AppConfig::default();
        cfg.service.provider = "simulated".into();
        assert!(ClassificationClient::from_config(&cfg).is_ok());

        cfg.service.provider = "cloud".into();
        assert!(ClassificationClient::from_config(&cfg).is_err());
    }
}
