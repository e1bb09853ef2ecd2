use anyhow::Result;
use assessment_core::config::{self, AppConfig};
use assessment_core::error::AssessmentError;
use assessment_core::i18n::Language;
use clap::{Parser, Subcommand};
use cli::commands::{self, ClassifyOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = match config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    };
    if let Some(lang) = cli.lang {
        cfg.report.language = lang;
    }

    let lang = cfg.report.language;
    if let Err(err) = run(cli.command, cfg).await {
        let message = match err.downcast_ref::<AssessmentError>() {
            Some(e) => e.localized(lang),
            None => format!("{err:#}"),
        };
        eprintln!("{message}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, mut cfg: AppConfig) -> Result<()> {
    match command {
        Commands::Classify {
            inputs,
            out,
            export,
            export_dir,
            simulate,
            dev_fallback,
            json,
        } => {
            if simulate {
                cfg.service.provider = "simulated".to_string();
            }
            if dev_fallback {
                cfg.service.dev_fallback = true;
            }
            commands::run_classify(
                &cfg,
                ClassifyOptions {
                    inputs,
                    out,
                    export,
                    export_dir,
                    json,
                },
            )
            .await
        }
        Commands::Export { from_html, out_dir } => {
            commands::run_export(&cfg, &from_html, out_dir.as_deref())
        }
        Commands::Simulate { names, seed } => {
            println!("{}", commands::simulate_json(&names, seed.or(cfg.simulator.seed))?);
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "pronounce")]
#[command(about = "Pronunciation assessment reports for batches of recordings", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Display language: th|en
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify recordings and render the report
    Classify {
        /// WAV files or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where to write the HTML report (defaults to report.output)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the CSV export
        #[arg(long, default_value_t = false)]
        export: bool,
        /// Directory for the CSV export (defaults to export.output_dir)
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Skip the service and use synthetic results
        #[arg(long, default_value_t = false)]
        simulate: bool,
        /// Fall back to synthetic results if the service fails (local development)
        #[arg(long, default_value_t = false)]
        dev_fallback: bool,
        /// Print results as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Export the CSV from a saved HTML report
    Export {
        /// Rendered report to read
        #[arg(long)]
        from_html: PathBuf,
        /// Output directory (defaults to export.output_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print synthetic results for file names
    Simulate {
        /// File names to simulate
        #[arg(required = true)]
        names: Vec<String>,
        /// Fixed seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}
