//! # Note Resolution Module
//!
//! Maps frequencies onto the twelve-tone equal-tempered scale. Given a
//! frequency in Hz this finds the nearest note, its octave in scientific
//! pitch notation (C4 starts octave 4) and the offset in cents.
//!
//! ## Features
//! - Configurable A4 reference (440 Hz by default)
//! - Note name display with a sharp or flat spelling preference
//! - Note name parsing with sharp or flat spellings
//! - Cent deviation calculation

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};

/// Concert pitch for A4 in Hz.
pub const A4_REFERENCE: f32 = 440.0;

/// Accepted A4 references, one octave either side of concert pitch.
pub const REFERENCE_RANGE: RangeInclusive<f32> = 220.0..=880.0;

/// One of the twelve pitch classes, ordered from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

/// Whether accidentals are written as sharps (`A#`) or flats (`Bb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierPreference {
    #[default]
    Sharps,
    Flats,
}

impl PitchClass {
    /// All pitch classes in ascending order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class lying `semitones` above (or below) A.
    pub fn from_a_offset(semitones: i32) -> Self {
        // A sits at index 9 of the C-based alphabet.
        Self::ALL[((semitones.rem_euclid(12) + 9) % 12) as usize]
    }

    /// Semitones above the C of the same octave (0..=11).
    pub fn semitones_above_c(self) -> i32 {
        self as i32
    }

    /// Name using sharps for accidentals.
    pub fn name(self) -> &'static str {
        self.name_with(ModifierPreference::Sharps)
    }

    pub fn name_with(self, preference: ModifierPreference) -> &'static str {
        const SHARPS: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        const FLATS: [&str; 12] = [
            "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
        ];
        match preference {
            ModifierPreference::Sharps => SHARPS[self as usize],
            ModifierPreference::Flats => FLATS[self as usize],
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every accepted spelling of a pitch class, mapped to its offset from C.
///
/// Offsets of -1 (`Cb`) and 12 (`B#`) cross into the neighbouring octave,
/// so `Cb4` parses as B3 and `B#3` as C4.
static SPELLINGS: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    const NATURALS: [(&str, i32); 7] = [
        ("C", 0),
        ("D", 2),
        ("E", 4),
        ("F", 5),
        ("G", 7),
        ("A", 9),
        ("B", 11),
    ];
    let mut map = HashMap::with_capacity(NATURALS.len() * 5);
    for (letter, offset) in NATURALS {
        map.insert(letter.to_string(), offset);
        for sharp in ["#", "♯"] {
            map.insert(format!("{letter}{sharp}"), offset + 1);
        }
        for flat in ["b", "♭"] {
            map.insert(format!("{letter}{flat}"), offset - 1);
        }
    }
    map
});

/// A pitch class paired with an octave number in scientific pitch notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: i32) -> Self {
        Self { pitch_class, octave }
    }

    /// The note lying `semitones` away from A4.
    ///
    /// The octave number changes at C, not at A, so A4 + 3 semitones is C5.
    pub fn from_semitones_from_a4(semitones: i32) -> Self {
        // i64 keeps `semitones + 9` from overflowing at the ends of i32.
        let octave = 4 + (i64::from(semitones) + 9).div_euclid(12);
        Self {
            pitch_class: PitchClass::from_a_offset(semitones),
            octave: octave as i32,
        }
    }

    /// Signed semitone distance from A4.
    pub fn semitones_from_a4(&self) -> i64 {
        (i64::from(self.octave) - 4) * 12 + i64::from(self.pitch_class.semitones_above_c()) - 9
    }

    /// Exact equal-tempered frequency of this note for the given A4 reference.
    ///
    /// Notes far outside the audible range may come out as `inf` or `0.0`.
    pub fn frequency(&self, reference: f32) -> f32 {
        exact_frequency(f64::from(reference), self.semitones_from_a4()) as f32
    }

    /// Displays this note with the given accidental spelling.
    pub fn spelled(self, preference: ModifierPreference) -> SpelledNote {
        SpelledNote {
            note: self,
            preference,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.spelled(ModifierPreference::Sharps), f)
    }
}

/// A [`Note`] paired with how its accidental should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpelledNote {
    pub note: Note,
    pub preference: ModifierPreference,
}

impl fmt::Display for SpelledNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.note.pitch_class.name_with(self.preference);
        // Pad the whole name, not just the octave, so `{:>4}` aligns columns.
        f.pad(&format!("{name}{}", self.note.octave))
    }
}

impl FromStr for Note {
    type Err = TunerError;

    /// Parses names like `A4`, `C#3`, `Bb2` or `G-1`.
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || TunerError::UnknownNoteName(s.to_string());
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(unknown)?;
        let (spelling, octave) = trimmed.split_at(split);

        let offset = *SPELLINGS.get(spelling).ok_or_else(unknown)?;
        let octave: i64 = octave.parse().map_err(|_| unknown())?;

        let semitones = (octave - 4) * 12 + i64::from(offset) - 9;
        let semitones = i32::try_from(semitones).map_err(|_| unknown())?;
        Ok(Self::from_semitones_from_a4(semitones))
    }
}

/// The nearest note to a frequency and how far the frequency is from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteResolution {
    pub note: Note,
    /// Exact frequency of `note` under the resolver's reference.
    pub exact_frequency: f32,
    /// Offset of the input from `exact_frequency` (positive = sharp).
    pub cents: f32,
}

/// Resolves frequencies to equal-tempered notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteResolver {
    reference: f32,
}

impl Default for NoteResolver {
    fn default() -> Self {
        Self {
            reference: A4_REFERENCE,
        }
    }
}

impl NoteResolver {
    /// Creates a resolver tuned to the given A4 reference in Hz.
    ///
    /// The reference must lie in [`REFERENCE_RANGE`].
    pub fn new(reference: f32) -> Result<Self> {
        if !REFERENCE_RANGE.contains(&reference) {
            return Err(TunerError::InvalidReference(reference));
        }
        Ok(Self { reference })
    }

    pub fn reference(&self) -> f32 {
        self.reference
    }

    /// Finds the nearest equal-tempered note to `frequency`.
    ///
    /// # Arguments
    /// * `frequency` - Input frequency in Hz, finite and positive
    ///
    /// # Returns
    /// * `Ok(resolution)` - Nearest note, its exact frequency and the cent offset
    /// * `Err(TunerError::InvalidFrequency)` - Zero, negative or non-finite
    ///   input, or input whose nearest note has no normal `f32` frequency
    ///
    /// A frequency exactly half way between two notes resolves to the upper
    /// one, reporting -50 cents. The maths runs in `f64`, so `cents` stays
    /// within ±50 once rounded to `f32`; exact quarter-tone inputs can still
    /// land on either side of the tie through `log2` rounding.
    pub fn resolve(&self, frequency: f32) -> Result<NoteResolution> {
        let invalid = || TunerError::InvalidFrequency(frequency);
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(invalid());
        }

        let frequency_hz = f64::from(frequency);
        let reference = f64::from(self.reference);
        let semitones = 12.0 * (frequency_hz / reference).log2();
        let nearest = nearest_semitone(semitones).ok_or_else(invalid)?;

        let exact_hz = exact_frequency(reference, i64::from(nearest));
        let exact_frequency = exact_hz as f32;
        if !exact_frequency.is_normal() {
            return Err(invalid());
        }

        Ok(NoteResolution {
            note: Note::from_semitones_from_a4(nearest),
            exact_frequency,
            cents: (1200.0 * (frequency_hz / exact_hz).log2()) as f32,
        })
    }
}

/// Rounds a fractional semitone distance, breaking ties upward.
///
/// `None` if the distance is not finite or does not fit an `i32`.
pub(crate) fn nearest_semitone(semitones: f64) -> Option<i32> {
    let rounded = (semitones + 0.5).floor();
    if rounded.is_finite() && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&rounded) {
        Some(rounded as i32)
    } else {
        None
    }
}

fn exact_frequency(reference: f64, semitones: i64) -> f64 {
    reference * 2.0_f64.powf(semitones as f64 / 12.0)
}

/// Resolves `frequency` against the standard A4 = 440 Hz reference.
pub fn resolve(frequency: f32) -> Result<NoteResolution> {
    NoteResolver::default().resolve(frequency)
}

/// Calculates the deviation from a target frequency in cents.
///
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn delta_cents(frequency: f32, target_frequency: f32) -> f32 {
    (1200.0 * (f64::from(frequency) / f64::from(target_frequency)).log2()) as f32
}
