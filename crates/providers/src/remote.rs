use crate::{AudioFile, ClassificationProvider, ProviderError, RawResult};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub endpoint: String,
    /// Multipart field repeated once per file.
    pub field_name: String,
}

/// Client for the remote classification service.
#[derive(Clone)]
pub struct RemoteClassifier {
    client: Client,
    cfg: Arc<RemoteConfig>,
}

impl RemoteClassifier {
    pub fn new(cfg: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.endpoint
        )
    }
}

#[derive(Deserialize)]
struct ClassifyApiResponse {
    #[serde(default)]
    results: Option<Vec<RawResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait::async_trait]
impl ClassificationProvider for RemoteClassifier {
    async fn classify(&self, files: &[AudioFile]) -> Result<Vec<RawResult>, ProviderError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.name.clone())
                .mime_str("audio/wav")
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
            form = form.part(self.cfg.field_name.clone(), part);
        }

        let url = self.url();
        debug!(%url, files = files.len(), "posting classification batch");
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ClassifyApiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ClassifyApiResponse =
            serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        // An error field fails the whole batch, even next to results.
        if let Some(err) = parsed.error {
            return Err(ProviderError::ServerReported(err));
        }
        parsed
            .results
            .ok_or_else(|| ProviderError::Decode("response carried neither results nor error".into()))
    }
}
