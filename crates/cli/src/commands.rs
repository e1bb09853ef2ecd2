use anyhow::Result;
use assessment_core::config::AppConfig;
use assessment_core::error::truncation_notice;
use assessment_core::i18n::Language;
use assessment_core::labels::Level;
use assessment_core::normalizer;
use assessment_core::pipeline;
use assessment_core::report::{share_text, summary_label, Report};
use assessment_core::upload::AddOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use providers::simulator::Simulator;
use providers::AudioFile;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub struct ClassifyOptions {
    pub inputs: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub export: bool,
    pub export_dir: Option<PathBuf>,
    pub json: bool,
}

pub async fn run_classify(cfg: &AppConfig, opts: ClassifyOptions) -> Result<()> {
    let lang = cfg.report.language;
    let spinner = busy_indicator(lang);
    let outcome = pipeline::run_assessment(cfg, &opts.inputs).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if let AddOutcome::Truncated { .. } = outcome.selection {
        eprintln!("{}", truncation_notice(cfg.upload.max_files, lang));
    }

    let report = outcome.report;
    let out = opts
        .out
        .unwrap_or_else(|| PathBuf::from(&cfg.report.output));
    pipeline::write_report(&report, &out)?;
    info!(path = %out.display(), "report written");

    if opts.json {
        println!("{}", serde_json::to_string_pretty(report.results())?);
    } else {
        for line in summary_lines(&report) {
            println!("{line}");
        }
        println!("report: {}", out.display());
    }

    if opts.export {
        let (_, path) = pipeline::export_to_dir(&report, cfg, opts.export_dir.as_deref())?;
        println!("export: {}", path.display());
    }
    Ok(())
}

pub fn run_export(cfg: &AppConfig, from_html: &Path, out_dir: Option<&Path>) -> Result<()> {
    let (doc, path) = pipeline::export_saved_report(from_html, cfg, out_dir)?;
    println!(
        "exported {} row(s) to {}",
        doc.summary.total,
        path.display()
    );
    Ok(())
}

/// Synthetic results for `names`, canonicalized, as pretty JSON.
pub fn simulate_json(names: &[String], seed: Option<u64>) -> Result<String> {
    let simulator = match seed {
        Some(seed) => Simulator::seeded(seed),
        None => Simulator::new(),
    };
    let files: Vec<AudioFile> = names
        .iter()
        .map(|n| AudioFile::new(n.clone(), Vec::new()))
        .collect();
    let results = normalizer::normalize_all(simulator.generate(&files))?;
    Ok(serde_json::to_string_pretty(&results)?)
}

pub fn summary_lines(report: &Report) -> Vec<String> {
    let summary = report.summary();
    let lang = report.language();
    let mut lines = vec![format!("{}: {}", summary_label(None, lang), summary.total)];
    for level in Level::ALL {
        let label = summary_label(Some(level), lang);
        let share = share_text(&summary, level);
        let line = format!("{}: {} {}", label, summary.count(level), share);
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn busy_indicator(lang: Language) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(lang.pick("กำลังวิเคราะห์...", "Analyzing..."));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
