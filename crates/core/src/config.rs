use crate::i18n::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// `remote` or `simulated`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Local development only: answer with synthetic data when the service fails.
    #[serde(default)]
    pub dev_fallback: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            field_name: default_field_name(),
            provider: default_provider(),
            dev_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            extensions: default_extensions(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_report_output")]
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            output: default_report_output(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_endpoint() -> String {
    "/api/classify".to_string()
}

fn default_field_name() -> String {
    "audio_files".to_string()
}

fn default_provider() -> String {
    "remote".to_string()
}

fn default_max_files() -> usize {
    10
}

fn default_extensions() -> Vec<String> {
    vec!["wav".to_string()]
}

fn default_report_output() -> String {
    "report.html".to_string()
}

fn default_export_file_name() -> String {
    crate::export::EXPORT_FILE_NAME.to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("PRONOUNCE").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
