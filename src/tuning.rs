//! Tuning engine — pitch and micro-tuning math.
//!
//! Pure functions of the tuning configuration: equal-tempered pitch from
//! a key slot, and per-degree detune offsets (in cents) for the pure
//! temperaments, measured against the current root note.

use crate::error::ChordboardError;

/// Semitones per octave.
pub const OCTAVE: usize = 12;

/// Slot index that sounds exactly at the reference pitch (A above middle C).
pub const A4_SLOT: i32 = 9;

/// Pitch-class constants, with the common enharmonic spellings.
/// German spellings (Cis, Es, H, ...) are included because the original
/// keyboard labels use them.
pub const NOTE_NAMES: &[(&str, u8)] = &[
    ("C", 0),
    ("Cis", 1), ("Des", 1), ("Db", 1), ("C#", 1),
    ("D", 2),
    ("Dis", 3), ("Es", 3), ("Eb", 3), ("D#", 3),
    ("E", 4), ("Fb", 4),
    ("F", 5),
    ("Fis", 6), ("Ges", 6), ("Gb", 6), ("F#", 6),
    ("G", 7),
    ("Gis", 8), ("As", 8), ("Ab", 8), ("G#", 8),
    ("A", 9),
    ("Ais", 10), ("Bb", 10), ("A#", 10),
    ("B", 11), ("H", 11), ("Cb", 11),
];

/// Look up a note name's pitch class. Accepts any spelling in [`NOTE_NAMES`].
pub fn pitch_class_of(name: &str) -> Option<u8> {
    NOTE_NAMES.iter().find(|(n, _)| *n == name).map(|&(_, pc)| pc)
}

/// Just-intonation frequency ratios for the twelve scale degrees above
/// the root, built from the major scale with just chromatic steps.
const PURE_MAJOR_RATIOS: [f64; OCTAVE] = [
    1.0,          // unison
    16.0 / 15.0,  // minor second
    9.0 / 8.0,    // major second
    6.0 / 5.0,    // minor third
    5.0 / 4.0,    // major third
    4.0 / 3.0,    // perfect fourth
    45.0 / 32.0,  // tritone
    3.0 / 2.0,    // perfect fifth
    8.0 / 5.0,    // minor sixth
    5.0 / 3.0,    // major sixth
    9.0 / 5.0,    // minor seventh
    15.0 / 8.0,   // major seventh
];

// TODO: substitute harmonic-minor ratios here; this table currently
// duplicates the major-scale ratios, so both pure temperaments sound
// identical for the same root.
const PURE_MINOR_RATIOS: [f64; OCTAVE] = PURE_MAJOR_RATIOS;

/// The three supported tuning systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningSystem {
    #[default]
    EqualTempered,
    PureTemperedMajor,
    PureTemperedMinor,
}

impl TuningSystem {
    /// Parse the wire / settings name of a tuning system.
    pub fn parse(name: &str) -> Result<Self, ChordboardError> {
        match name {
            "equal-tempered" => Ok(TuningSystem::EqualTempered),
            "pure-tempered-major" => Ok(TuningSystem::PureTemperedMajor),
            "pure-tempered-minor" => Ok(TuningSystem::PureTemperedMinor),
            other => Err(ChordboardError::InvalidTuningSystem {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TuningSystem::EqualTempered => "equal-tempered",
            TuningSystem::PureTemperedMajor => "pure-tempered-major",
            TuningSystem::PureTemperedMinor => "pure-tempered-minor",
        }
    }

    /// Ratio table for a pure temperament; `None` for equal temperament.
    fn ratios(&self) -> Option<&'static [f64; OCTAVE]> {
        match self {
            TuningSystem::EqualTempered => None,
            TuningSystem::PureTemperedMajor => Some(&PURE_MAJOR_RATIOS),
            TuningSystem::PureTemperedMinor => Some(&PURE_MINOR_RATIOS),
        }
    }
}

/// Tuning configuration: reference pitch, harmonic root, and temperament.
///
/// Held per keyboard instance rather than globally, so independent
/// keyboards can carry independent tunings.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    a4: f64,
    root: u8,
    system: TuningSystem,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            a4: 440.0,
            root: 0,
            system: TuningSystem::EqualTempered,
        }
    }
}

impl Tuning {
    /// Reference pitch in Hz (frequency of slot 9).
    pub fn a4(&self) -> f64 {
        self.a4
    }

    /// Set the reference pitch. Accepts [400, 500] Hz.
    pub fn set_a4(&mut self, hz: f64) -> Result<(), ChordboardError> {
        if !hz.is_finite() || !(400.0..=500.0).contains(&hz) {
            log::warn!("rejected reference pitch {hz}");
            return Err(ChordboardError::InvalidNumber {
                what: "reference pitch",
                value: hz,
            });
        }
        self.a4 = hz;
        Ok(())
    }

    /// Current root pitch class in [0, 11].
    pub fn root(&self) -> u8 {
        self.root
    }

    /// Set the root pitch class. Both user selection and chord inference
    /// funnel through here.
    pub fn set_root(&mut self, pitch_class: i32) -> Result<(), ChordboardError> {
        if !(0..OCTAVE as i32).contains(&pitch_class) {
            return Err(ChordboardError::InvalidNote { value: pitch_class });
        }
        self.root = pitch_class as u8;
        Ok(())
    }

    pub fn system(&self) -> TuningSystem {
        self.system
    }

    pub fn set_system(&mut self, system: TuningSystem) {
        self.system = system;
    }

    /// Equal-tempered frequency of a key slot: `a4 * 2^((slot - 9) / 12)`.
    ///
    /// Holds for any integer slot, including negative offsets below the
    /// keyboard range.
    pub fn pitch(&self, slot: i32) -> f64 {
        self.a4 * ((slot - A4_SLOT) as f64 / OCTAVE as f64).exp2()
    }

    /// Micro-tuning offset in cents for a key slot under the active
    /// temperament.
    ///
    /// Zero everywhere under equal temperament, and always zero at the
    /// root itself. Otherwise the offset of the just ratio for the slot's
    /// scale degree (relative to the root) from its equal-tempered pitch:
    /// `1200 * log2(ratio) - 100 * degree`.
    pub fn detune_cents(&self, slot: i32) -> f64 {
        let Some(ratios) = self.system.ratios() else {
            return 0.0;
        };
        let degree = (slot.rem_euclid(OCTAVE as i32) - self.root as i32)
            .rem_euclid(OCTAVE as i32) as usize;
        1200.0 * ratios[degree].log2() - 100.0 * degree as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_nine_is_reference_pitch() {
        for a4 in [400.0, 432.0, 440.0, 442.0, 500.0] {
            let mut t = Tuning::default();
            t.set_a4(a4).unwrap();
            assert!((t.pitch(9) - a4).abs() < 1e-12, "pitch(9) should be {a4}");
        }
    }

    #[test]
    fn octave_doubling() {
        let t = Tuning::default();
        for slot in -24..=24 {
            let low = t.pitch(slot);
            let high = t.pitch(slot + 12);
            assert!(
                (high - 2.0 * low).abs() < 1e-9,
                "pitch({}) should be twice pitch({slot})",
                slot + 12
            );
        }
    }

    #[test]
    fn middle_c_from_a440() {
        let t = Tuning::default();
        // Slot 0 is C, nine semitones below A4.
        assert!((t.pitch(0) - 261.6255653).abs() < 1e-6);
    }

    #[test]
    fn equal_tempered_never_detunes() {
        let mut t = Tuning::default();
        for root in 0..12 {
            t.set_root(root).unwrap();
            for slot in 0..25 {
                assert_eq!(t.detune_cents(slot), 0.0);
            }
        }
    }

    #[test]
    fn pure_root_degree_is_never_detuned() {
        let mut t = Tuning::default();
        t.set_system(TuningSystem::PureTemperedMajor);
        for root in 0..12i32 {
            t.set_root(root).unwrap();
            assert_eq!(t.detune_cents(root), 0.0);
            assert_eq!(t.detune_cents(root + 12), 0.0);
        }
    }

    #[test]
    fn pure_major_third_and_fifth_offsets() {
        let mut t = Tuning::default();
        t.set_system(TuningSystem::PureTemperedMajor);
        t.set_root(0).unwrap();
        // Just major third is ~13.7 cents flat of equal temperament.
        assert!((t.detune_cents(4) - (-13.686)).abs() < 0.01);
        // Just perfect fifth is ~2 cents sharp.
        assert!((t.detune_cents(7) - 1.955).abs() < 0.01);
    }

    #[test]
    fn degree_is_relative_to_root() {
        let mut t = Tuning::default();
        t.set_system(TuningSystem::PureTemperedMajor);
        t.set_root(0).unwrap();
        let third_from_c = t.detune_cents(4);
        t.set_root(2).unwrap();
        // With root D, F# (slot 6) is the major third.
        assert!((t.detune_cents(6) - third_from_c).abs() < 1e-9);
    }

    #[test]
    fn minor_table_currently_matches_major() {
        let mut major = Tuning::default();
        major.set_system(TuningSystem::PureTemperedMajor);
        let mut minor = Tuning::default();
        minor.set_system(TuningSystem::PureTemperedMinor);
        for slot in 0..12 {
            assert_eq!(major.detune_cents(slot), minor.detune_cents(slot));
        }
    }

    #[test]
    fn reference_pitch_rejects_out_of_range() {
        let mut t = Tuning::default();
        for bad in [399.9, 500.1, -1.0, f64::NAN, f64::INFINITY] {
            let before = t.a4();
            assert!(matches!(
                t.set_a4(bad),
                Err(ChordboardError::InvalidNumber { .. })
            ));
            assert_eq!(t.a4(), before, "rejected set must not change state");
        }
        t.set_a4(400.0).unwrap();
        t.set_a4(500.0).unwrap();
    }

    #[test]
    fn root_rejects_out_of_range() {
        let mut t = Tuning::default();
        t.set_root(11).unwrap();
        for bad in [-1, 12, 100] {
            assert_eq!(
                t.set_root(bad),
                Err(ChordboardError::InvalidNote { value: bad })
            );
            assert_eq!(t.root(), 11);
        }
    }

    #[test]
    fn tuning_system_names_round_trip() {
        for name in ["equal-tempered", "pure-tempered-major", "pure-tempered-minor"] {
            assert_eq!(TuningSystem::parse(name).unwrap().as_str(), name);
        }
        assert!(matches!(
            TuningSystem::parse("meantone"),
            Err(ChordboardError::InvalidTuningSystem { .. })
        ));
    }

    #[test]
    fn note_name_lookup() {
        assert_eq!(pitch_class_of("C"), Some(0));
        assert_eq!(pitch_class_of("Eb"), Some(3));
        assert_eq!(pitch_class_of("Es"), Some(3));
        assert_eq!(pitch_class_of("H"), Some(11));
        assert_eq!(pitch_class_of("X"), None);
    }
}
