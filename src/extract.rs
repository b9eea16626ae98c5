//! Per-file extraction: read, split, persist, optionally delete the source

use motion_core::{split, OutputNames};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::OutputConfig;
use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// Both assets written
    Extracted,
    /// Split succeeded but nothing was written
    DryRun,
    /// Outputs were already present
    AlreadyExtracted,
    /// Not a usable motion photo
    Skipped,
    /// I/O failure
    Failed,
}

/// What happened to one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub status: FileStatus,
    pub photo_path: PathBuf,
    pub video_path: PathBuf,
    pub source_size: u64,
    pub photo_size: u64,
    pub video_size: u64,
    pub discarded_bytes: u64,
    pub deleted_original: bool,
    pub message: Option<String>,
    pub processing_time: Duration,
}

impl FileReport {
    fn new(source: &Path, names: OutputNames) -> Self {
        Self {
            source: source.to_path_buf(),
            status: FileStatus::Failed,
            photo_path: names.photo,
            video_path: names.video,
            source_size: 0,
            photo_size: 0,
            video_size: 0,
            discarded_bytes: 0,
            deleted_original: false,
            message: None,
            processing_time: Duration::ZERO,
        }
    }

    pub fn filename(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Drives the core splitter for files on disk
#[derive(Debug, Clone)]
pub struct MotionExtractor {
    options: OutputConfig,
}

impl MotionExtractor {
    pub fn new(options: OutputConfig) -> Self {
        Self { options }
    }

    /// Where the assets of `source` will be written
    pub fn output_names(&self, source: &Path) -> OutputNames {
        OutputNames::for_source(source, self.options.output_dir.as_deref())
    }

    /// Report for a source left untouched because `owner` writes the same outputs
    pub fn collision_report(&self, source: &Path, owner: &Path) -> FileReport {
        let mut report = FileReport::new(source, self.output_names(source));
        error!(
            "❌ Output collision: {} would overwrite outputs of {}",
            source.display(),
            owner.display()
        );
        report.message = Some(format!(
            "outputs {} and {} are already claimed by {}",
            report.photo_path.display(),
            report.video_path.display(),
            owner.display()
        ));
        report
    }

    /// Extract one file. Never fails: every outcome is recorded in the report.
    pub async fn extract_file(&self, source: &Path) -> FileReport {
        let start_time = Instant::now();
        let names = self.output_names(source);
        let skip = self.options.skip_existing && names.exist();
        let mut report = FileReport::new(source, names);

        if skip {
            info!("⏭️  Already extracted: {}", source.display());
            report.status = FileStatus::AlreadyExtracted;
        } else if let Err(e) = self.run(&mut report).await {
            error!("❌ Failed: {} - {}", source.display(), e);
            report.status = FileStatus::Failed;
            report.message = Some(e.to_string());
        }

        report.processing_time = start_time.elapsed();
        report
    }

    async fn run(&self, report: &mut FileReport) -> Result<()> {
        let source = report.source.clone();
        info!("📷 Processing: {}", source.display());

        let data = fs::read(&source)
            .await
            .map_err(|e| ExtractError::io(&source, e))?;
        report.source_size = data.len() as u64;
        info!("File size: {:.2} MB", data.len() as f64 / (1024.0 * 1024.0));

        let (data, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = split(&data);
            (data, outcome)
        })
        .await?;

        let result = match outcome {
            Ok(result) => result,
            Err(reason) => {
                warn!("⏭️  Skipping {}: {}", source.display(), reason);
                report.status = FileStatus::Skipped;
                report.message = Some(reason.to_string());
                return Ok(());
            }
        };

        debug!(
            "{}: photo {:?}, video {:?}",
            source.display(),
            result.photo_range,
            result.video_range
        );
        report.photo_size = result.photo_range.len() as u64;
        report.video_size = result.video_range.len() as u64;
        report.discarded_bytes = result.gap_len() as u64;

        if self.options.dry_run {
            info!(
                "Would write {} and {}",
                report.photo_path.display(),
                report.video_path.display()
            );
            report.status = FileStatus::DryRun;
            return Ok(());
        }

        if let Some(ref dir) = self.options.output_dir {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ExtractError::io(dir, e))?;
        }

        debug!("Saving photo...");
        fs::write(&report.photo_path, result.photo(&data))
            .await
            .map_err(|e| ExtractError::io(&report.photo_path, e))?;

        debug!("Saving video...");
        fs::write(&report.video_path, result.video(&data))
            .await
            .map_err(|e| ExtractError::io(&report.video_path, e))?;

        info!(
            "✅ Extracted files saved as: {} and {}",
            report.photo_path.display(),
            report.video_path.display()
        );
        report.status = FileStatus::Extracted;

        if self.options.delete_original {
            match fs::remove_file(&source).await {
                Ok(()) => {
                    info!("🗑️  Deleted original: {}", source.display());
                    report.deleted_original = true;
                }
                Err(e) => {
                    warn!("Failed to delete original {}: {}", source.display(), e);
                    report.message = Some(format!("failed to delete original: {}", e));
                }
            }
        }

        Ok(())
    }
}
