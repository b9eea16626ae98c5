use anyhow::Result;
use chrono::{DateTime, Utc};
use motion_core::OutputNames;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::extract::{FileReport, FileStatus, MotionExtractor};

/// Overall batch results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub extracted: usize,
    pub dry_run: usize,
    pub already_extracted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub total_time: Duration,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    fn from_files(mut files: Vec<FileReport>, started_at: DateTime<Utc>, total_time: Duration) -> Self {
        files.sort_by(|a, b| a.source.cmp(&b.source));
        let count = |status: FileStatus| files.iter().filter(|f| f.status == status).count();
        let extracted = count(FileStatus::Extracted);
        let dry_run = count(FileStatus::DryRun);
        let already_extracted = count(FileStatus::AlreadyExtracted);
        let skipped = count(FileStatus::Skipped);
        let failed = count(FileStatus::Failed);

        Self {
            total: files.len(),
            extracted,
            dry_run,
            already_extracted,
            skipped,
            failed,
            started_at,
            total_time,
            files,
        }
    }

    /// Any file hit an I/O failure. Skipped files do not count.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Write the report as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json_data = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json_data).await?;
        info!("💾 Report saved to: {}", path.display());
        Ok(())
    }
}

/// Splits many files concurrently with a bounded worker pool
pub struct BatchProcessor {
    extractor: Arc<MotionExtractor>,
    worker_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl BatchProcessor {
    pub fn new(config: &Config) -> Self {
        let max_workers = config.performance.max_workers.max(1);
        info!("🔧 Initializing BatchProcessor with {} workers", max_workers);

        Self {
            extractor: Arc::new(MotionExtractor::new(config.output.clone())),
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
            max_concurrent: max_workers,
        }
    }

    /// Process every file; one file's outcome never stops the others
    pub async fn process_files(&self, paths: Vec<PathBuf>) -> BatchReport {
        let started_at = Utc::now();
        let start_time = Instant::now();

        if paths.is_empty() {
            warn!("No motion photo candidates to process");
            return BatchReport::from_files(Vec::new(), started_at, start_time.elapsed());
        }

        info!("🚀 Processing {} files...", paths.len());
        let (claimed, mut files) = self.claim_outputs(paths);
        files.extend(self.process_parallel(claimed).await);

        BatchReport::from_files(files, started_at, start_time.elapsed())
    }

    /// Keep the first source for each pair of output names. Later sources that
    /// map to the same names are reported failed and never touched.
    fn claim_outputs(&self, paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<FileReport>) {
        let mut owners: HashMap<OutputNames, PathBuf> = HashMap::new();
        let mut claimed = Vec::with_capacity(paths.len());
        let mut collisions = Vec::new();

        for path in paths {
            match owners.entry(self.extractor.output_names(&path)) {
                Entry::Occupied(owner) => {
                    collisions.push(self.extractor.collision_report(&path, owner.get()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(path.clone());
                    claimed.push(path);
                }
            }
        }

        (claimed, collisions)
    }

    async fn process_parallel(&self, paths: Vec<PathBuf>) -> Vec<FileReport> {
        let (tx, mut rx) = mpsc::channel(self.max_concurrent);
        let total_files = paths.len();

        for (index, path) in paths.into_iter().enumerate() {
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&self.worker_semaphore);
            let tx = tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                info!("📷 File {}/{}: {}", index + 1, total_files, path.display());
                let report = extractor.extract_file(&path).await;
                debug!("{} finished: {:?}", report.filename(), report.status);

                if let Err(e) = tx.send(report).await {
                    error!("Failed to send result: {}", e);
                }
            });
        }

        // Channel closes once every task has dropped its sender
        drop(tx);

        let mut files = Vec::with_capacity(total_files);
        while let Some(report) = rx.recv().await {
            files.push(report);
        }

        files
    }
}
