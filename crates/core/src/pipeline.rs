use crate::classifier::ClassificationClient;
use crate::config::AppConfig;
use crate::export::{self, ExportDocument};
use crate::report::Report;
use crate::scanner;
use crate::upload::{self, AddOutcome, UploadBatch};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct AssessmentOutcome {
    pub selection: AddOutcome,
    pub report: Report,
}

/// Collects `inputs` into an upload batch, classifies it and renders the report.
pub async fn run_assessment(cfg: &AppConfig, inputs: &[PathBuf]) -> anyhow::Result<AssessmentOutcome> {
    let client = ClassificationClient::from_config(cfg)?;
    let mut report = Report::new(cfg.report.language);
    let mut batch = UploadBatch::new(&cfg.upload);

    info!("Collecting audio files...");
    let paths = scanner::collect_audio_paths(inputs, &cfg.upload.extensions, &cfg.upload.exclude)?;
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push(upload::load_audio_file(path).await?);
    }
    let selection = batch.add(files)?;
    info!("Selected {} file(s).", batch.len());

    assess_batch(&client, &mut batch, &mut report).await?;
    Ok(AssessmentOutcome { selection, report })
}

/// Submits the batch and replaces the report with the outcome.
pub async fn assess_batch(
    client: &ClassificationClient,
    batch: &mut UploadBatch,
    report: &mut Report,
) -> anyhow::Result<()> {
    let files = batch.take()?;
    info!("Classifying {} file(s)...", files.len());
    let results = client.classify(&files).await?;
    report.render(results)?;
    info!("Report rendered with {} row(s).", report.results().len());
    Ok(())
}

pub fn write_report(report: &Report, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, report.html())
        .with_context(|| format!("Failed to write report: {:?}", path))?;
    Ok(())
}

pub fn export_to_dir(
    report: &Report,
    cfg: &AppConfig,
    dir: Option<&Path>,
) -> anyhow::Result<(ExportDocument, PathBuf)> {
    let doc = export::export_report(report, &cfg.export.file_name)?;
    let dir = dir.unwrap_or_else(|| Path::new(&cfg.export.output_dir));
    let path = doc.save(dir)?;
    Ok((doc, path))
}

pub fn export_saved_report(
    html_path: &Path,
    cfg: &AppConfig,
    dir: Option<&Path>,
) -> anyhow::Result<(ExportDocument, PathBuf)> {
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("Failed to read report: {:?}", html_path))?;
    let doc = export::export_html(&html, &cfg.export.file_name)?;
    let dir = dir.unwrap_or_else(|| Path::new(&cfg.export.output_dir));
    let path = doc.save(dir)?;
    Ok((doc, path))
}
