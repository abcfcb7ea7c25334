//! # Pitch Tracking Module
//!
//! Smooths a noisy stream of instantaneous frequency estimates with an
//! exponential moving average and keeps the resulting note reading current.
//!
//! The tracker is single-writer: feed it from one thread in arrival order.
//! Hosts that read the latest [`PitchReading`] from another thread must
//! publish it themselves, e.g. by sending a copy over a channel.

use log::{debug, trace, warn};
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::error::{Result, TunerError};
use crate::notes::{Note, NoteResolver};

/// The tracker's current view of the sounding pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchReading {
    /// Filtered frequency in Hz.
    pub smoothed_frequency: f32,
    pub closest_note: Note,
    /// Offset of `smoothed_frequency` from `closest_note` (positive = sharp).
    pub delta_cents: f32,
}

impl PitchReading {
    /// Whether the reading is within `tolerance_cents` of its note.
    pub fn in_tune(&self, tolerance_cents: f32) -> bool {
        self.delta_cents.abs() <= tolerance_cents
    }
}

/// Exponential-moving-average pitch tracker.
#[derive(Debug, Clone)]
pub struct PitchTracker {
    smoothing_factor: f32,
    resolver: NoteResolver,
    reading: Option<PitchReading>,
    update_count: u64,
}

impl PitchTracker {
    /// Creates a tracker against the standard A4 = 440 Hz reference.
    ///
    /// # Arguments
    /// * `smoothing_factor` - Weight of each new sample, in (0, 1]. Larger
    ///   values follow the input faster but pass through more jitter.
    pub fn new(smoothing_factor: f32) -> Result<Self> {
        Self::with_resolver(smoothing_factor, NoteResolver::default())
    }

    pub fn with_resolver(smoothing_factor: f32, resolver: NoteResolver) -> Result<Self> {
        if !(smoothing_factor > 0.0 && smoothing_factor <= 1.0) {
            return Err(TunerError::InvalidSmoothingFactor(smoothing_factor));
        }
        Ok(Self {
            smoothing_factor,
            resolver,
            reading: None,
            update_count: 0,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::with_resolver(
            config.smoothing_factor,
            NoteResolver::new(config.reference_a4)?,
        )
    }

    /// Feeds one raw frequency estimate into the filter.
    ///
    /// Zero, negative and non-finite values are the estimator's "no pitch"
    /// signal and are dropped without touching any state. The first accepted
    /// sample seeds the filter directly; later samples move the smoothed
    /// value by `smoothing_factor` of the difference.
    ///
    /// # Returns
    /// * `true` if the sample was accepted and the reading updated
    pub fn update_pitch(&mut self, new_frequency: f32) -> bool {
        if !new_frequency.is_finite() || new_frequency <= 0.0 {
            trace!(target: "tracker", "ignoring {new_frequency} Hz");
            return false;
        }

        let smoothed = match &self.reading {
            Some(reading) => {
                let previous = reading.smoothed_frequency;
                previous + self.smoothing_factor * (new_frequency - previous)
            }
            None => new_frequency,
        };

        // Values whose nearest note has no representable frequency are dropped.
        let resolution = match self.resolver.resolve(smoothed) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(target: "tracker", "dropping {new_frequency} Hz: {err}");
                return false;
            }
        };

        let reading = PitchReading {
            smoothed_frequency: smoothed,
            closest_note: resolution.note,
            delta_cents: resolution.cents,
        };
        debug!(
            target: "tracker",
            "{new_frequency:.2} Hz -> {smoothed:.2} Hz ({} {:+.1} cents)",
            reading.closest_note, reading.delta_cents
        );
        self.reading = Some(reading);
        self.update_count += 1;
        true
    }

    /// The latest reading, or `None` before the first accepted sample.
    pub fn reading(&self) -> Option<&PitchReading> {
        self.reading.as_ref()
    }

    pub fn smoothed_frequency(&self) -> Option<f32> {
        self.reading.map(|r| r.smoothed_frequency)
    }

    pub fn closest_note(&self) -> Option<Note> {
        self.reading.map(|r| r.closest_note)
    }

    pub fn delta_cents(&self) -> Option<f32> {
        self.reading.map(|r| r.delta_cents)
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    pub fn resolver(&self) -> &NoteResolver {
        &self.resolver
    }

    /// Number of samples accepted so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::PitchClass;

    #[test]
    fn first_sample_seeds_without_damping() {
        let mut tracker = PitchTracker::new(0.1).unwrap();
        assert!(tracker.reading().is_none());

        assert!(tracker.update_pitch(440.0));
        let reading = tracker.reading().unwrap();
        assert_eq!(reading.smoothed_frequency, 440.0);
        assert_eq!(reading.closest_note, Note::new(PitchClass::A, 4));
        assert_eq!(reading.delta_cents, 0.0);
    }

    #[test]
    fn later_samples_follow_the_moving_average() {
        let mut tracker = PitchTracker::new(0.5).unwrap();
        tracker.update_pitch(440.0);
        tracker.update_pitch(450.0);
        assert_eq!(tracker.smoothed_frequency(), Some(445.0));
        tracker.update_pitch(445.0);
        assert_eq!(tracker.smoothed_frequency(), Some(445.0));
        assert_eq!(tracker.update_count(), 3);
    }

    #[test]
    fn smoothing_factor_changes_the_reading() {
        let mut fast = PitchTracker::new(0.8).unwrap();
        let mut slow = PitchTracker::new(0.2).unwrap();
        for frequency in [440.0, 450.0] {
            fast.update_pitch(frequency);
            slow.update_pitch(frequency);
        }
        let fast_cents = fast.delta_cents().unwrap();
        let slow_cents = slow.delta_cents().unwrap();
        assert_ne!(fast_cents, slow_cents);
        assert!(fast_cents > slow_cents);
    }

    #[test]
    fn factor_of_one_tracks_raw_input() {
        let mut tracker = PitchTracker::new(1.0).unwrap();
        tracker.update_pitch(440.0);
        tracker.update_pitch(261.63);
        let smoothed = tracker.smoothed_frequency().unwrap();
        assert!((smoothed - 261.63).abs() < 1e-3);
        assert_eq!(tracker.closest_note(), Some(Note::new(PitchClass::C, 4)));
    }

    #[test]
    fn silent_samples_leave_state_untouched() {
        let mut tracker = PitchTracker::new(0.3).unwrap();
        for bad in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            assert!(!tracker.update_pitch(bad));
        }
        assert!(tracker.reading().is_none());
        assert_eq!(tracker.update_count(), 0);

        tracker.update_pitch(440.0);
        tracker.update_pitch(460.0);
        let before = *tracker.reading().unwrap();
        assert!(!tracker.update_pitch(-5.0));
        assert!(!tracker.update_pitch(0.0));
        assert_eq!(*tracker.reading().unwrap(), before);
        assert_eq!(tracker.update_count(), 2);
    }

    #[test]
    fn unresolvable_extremes_are_dropped() {
        let mut tracker = PitchTracker::new(0.5).unwrap();
        assert!(!tracker.update_pitch(f32::MAX));
        assert!(!tracker.update_pitch(1e-45));
        assert!(tracker.reading().is_none());
        assert_eq!(tracker.update_count(), 0);

        // With no smoothing the extreme sample is what gets resolved.
        let mut raw = PitchTracker::new(1.0).unwrap();
        raw.update_pitch(440.0);
        let before = *raw.reading().unwrap();
        assert!(!raw.update_pitch(f32::MAX));
        assert!(!raw.update_pitch(1e-45));
        assert_eq!(*raw.reading().unwrap(), before);
        assert_eq!(raw.update_count(), 1);
    }

    #[test]
    fn rejects_out_of_range_smoothing_factors() {
        for bad in [0.0, -0.1, 1.01, f32::NAN] {
            assert!(matches!(
                PitchTracker::new(bad),
                Err(TunerError::InvalidSmoothingFactor(_))
            ));
        }
    }

    #[test]
    fn uses_configured_reference() {
        let config = TrackerConfig {
            smoothing_factor: 1.0,
            reference_a4: 415.0,
            ..TrackerConfig::default()
        };
        let mut tracker = PitchTracker::from_config(&config).unwrap();
        tracker.update_pitch(415.0);
        let reading = tracker.reading().unwrap();
        assert_eq!(reading.closest_note, Note::new(PitchClass::A, 4));
        assert!(reading.in_tune(0.5));
    }
}
