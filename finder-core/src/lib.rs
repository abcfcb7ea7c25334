// finder-core/src/lib.rs

//! The core logic for the frequency finder tuner.
//! This crate turns a stream of raw frequency estimates into smoothed note
//! readings, records them on request and summarises recordings. It does no
//! audio capture or pitch estimation of its own and contains no GUI code.
//!
//! Data flows one way: raw Hz -> [`PitchTracker`] -> [`RecordingSession`]
//! -> [`statistics::calculate`]. The host forwards each sample to both the
//! tracker and the session.

pub mod config;
pub mod error;
pub mod notes;
pub mod recording;
pub mod statistics;
pub mod tracker;

pub use config::{SmoothingPreset, TrackerConfig};
pub use error::{Result, TunerError};
pub use notes::{ModifierPreference, Note, NoteResolution, NoteResolver, PitchClass, SpelledNote};
pub use recording::{RecordingExport, RecordingSession, RecordingState};
pub use statistics::Statistics;
pub use tracker::{PitchReading, PitchTracker};
