//! # Recording Module
//!
//! A start/stop/clear recorder that buffers the frequencies it is handed
//! while active. It knows nothing about smoothing or notes; the host forwards
//! samples to it alongside the tracker.

use log::{info, trace};
use serde::Serialize;

use crate::statistics::{self, Statistics};

/// Whether the session is currently accepting samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

/// Buffers frequency samples between `start` and `stop`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    state: RecordingState,
    samples: Vec<f32>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a fresh recording. Any previous samples are discarded.
    pub fn start(&mut self) {
        if !self.samples.is_empty() {
            trace!(target: "recording", "discarding {} samples", self.samples.len());
        }
        self.samples.clear();
        self.state = RecordingState::Recording;
        info!(target: "recording", "recording started");
    }

    /// Stops accepting samples. The buffer is kept for reading or clearing.
    pub fn stop(&mut self) {
        if self.state == RecordingState::Recording {
            info!(
                target: "recording",
                "recording stopped with {} samples",
                self.samples.len()
            );
        }
        self.state = RecordingState::Idle;
    }

    /// Empties the buffer without changing the recording state.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Appends `frequency` if recording.
    ///
    /// Calling this while idle is allowed and does nothing, so hosts can
    /// forward every tracked sample unconditionally.
    ///
    /// # Returns
    /// * `true` if the sample was appended
    pub fn add_pitch(&mut self, frequency: f32) -> bool {
        match self.state {
            RecordingState::Recording => {
                self.samples.push(frequency);
                true
            }
            RecordingState::Idle => {
                trace!(target: "recording", "idle, dropping {frequency} Hz");
                false
            }
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Recorded samples in arrival order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// An owned copy of the buffer, independent of later recording.
    pub fn snapshot(&self) -> Vec<f32> {
        self.samples.clone()
    }

    /// Statistics over the current buffer, `None` if it is empty.
    pub fn statistics(&self) -> Option<Statistics> {
        statistics::calculate(&self.samples)
    }

    /// The buffer and its statistics in a serializable form.
    pub fn export(&self) -> RecordingExport {
        RecordingExport {
            samples: self.snapshot(),
            statistics: self.statistics(),
        }
    }
}

/// A recording as handed to persistence or export code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingExport {
    pub samples: Vec<f32>,
    pub statistics: Option<Statistics>,
}
