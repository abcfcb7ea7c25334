//! # Error Module
//!
//! Failures surfaced by the core. Most of the pipeline absorbs bad input
//! (the tracker drops silent frames, the recorder drops idle samples), so
//! these only reach callers that ask for something directly.

use std::path::PathBuf;

/// Errors returned by `finder-core`.
#[derive(thiserror::Error, Debug)]
pub enum TunerError {
    /// A frequency that is zero, negative, NaN or infinite.
    #[error("invalid frequency {0} Hz: must be finite and positive")]
    InvalidFrequency(f32),
    #[error("invalid smoothing factor {0}: must be in (0, 1]")]
    InvalidSmoothingFactor(f32),
    #[error("invalid A4 reference {0} Hz: must be finite and positive")]
    InvalidReference(f32),
    #[error("unknown note name {0:?}")]
    UnknownNoteName(String),
    #[error("could not read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TunerError>;
