//! Motion Extract - split JPEG+MP4 motion photos into separate files
//!
//! The container splitting itself lives in `motion-core`; this crate finds the
//! candidate files, writes the extracted assets and reports on a whole batch.

pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod processing;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::discovery::CandidateFinder;
pub use crate::error::ExtractError;
pub use crate::extract::{FileReport, FileStatus, MotionExtractor};
pub use crate::processing::{BatchProcessor, BatchReport};
pub use motion_core::{split, OutputNames, SplitError, SplitResult};
