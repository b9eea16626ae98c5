use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use motion_extract::{BatchProcessor, CandidateFinder, Config};

#[derive(Parser)]
#[command(name = "motion-extract")]
#[command(version, about = "Extract the photo and video from JPEG+MP4 motion photos")]
struct Cli {
    /// Files, directories or glob patterns (e.g. "camera/*.jpg")
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory for extracted files (defaults to each source's directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Delete the original once both assets are written
    #[arg(short, long)]
    delete_original: bool,

    /// Walk directories given as inputs
    #[arg(short, long)]
    recursive: bool,

    /// Skip sources whose outputs already exist
    #[arg(long)]
    skip_existing: bool,

    /// Split files but write and delete nothing
    #[arg(long)]
    dry_run: bool,

    /// Number of files processed in parallel
    #[arg(short, long, value_name = "NUM")]
    workers: Option<usize>,

    /// Save a JSON report of the batch
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref dir) = self.output_dir {
            config.output.output_dir = Some(dir.clone());
        }
        if let Some(workers) = self.workers {
            config.performance.max_workers = workers;
        }
        if let Some(ref report) = self.report {
            config.output.report_path = Some(report.clone());
        }
        config.output.delete_original |= self.delete_original;
        config.output.skip_existing |= self.skip_existing;
        config.output.dry_run |= self.dry_run;
        config.discovery.recursive |= self.recursive;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "motion_extract=debug,info"
    } else {
        "motion_extract=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {:#}", e);
            Config::default()
        }),
    };
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    info!("🚀 Motion Extract starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let finder = CandidateFinder::new(&config.discovery)?;
    let candidates = finder.discover(&cli.inputs[..])?;
    info!("🔍 Found {} candidate files", candidates.len());

    let processor = BatchProcessor::new(&config);
    let report = processor.process_files(candidates).await;

    info!("🎉 Done in {:.2}s", report.total_time.as_secs_f64());
    info!("✅ Extracted: {}", report.extracted);
    if report.dry_run > 0 {
        info!("📝 Dry run: {}", report.dry_run);
    }
    if report.already_extracted > 0 {
        info!("⏭️  Already extracted: {}", report.already_extracted);
    }
    info!("⏭️  Skipped: {}", report.skipped);
    info!("❌ Failed: {}", report.failed);

    if let Some(ref path) = config.output.report_path {
        report.save(path).await?;
    }

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
