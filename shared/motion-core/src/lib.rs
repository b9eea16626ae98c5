//! Motion Core - Container splitting for JPEG+MP4 motion photos
//!
//! A motion photo is a complete JPEG image followed by a complete MP4 clip in a
//! single file. This crate finds the boundary between the two and hands back
//! the byte ranges; reading and writing files is left to the caller.

pub mod output;
pub mod splitter;

pub use output::OutputNames;
pub use splitter::{locate_container_start, locate_image_end, split, SplitResult};

/// Outcome of splitting one buffer
pub type SplitOutcome = std::result::Result<SplitResult, SplitError>;

/// Reasons a buffer is not a usable motion photo
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitError {
    #[error("no MP4 ftyp marker found, not a motion photo")]
    NoContainerMarkerFound,

    #[error("MP4 container found but no JPEG end-of-image marker precedes it")]
    NoImageTerminatorFound,
}
