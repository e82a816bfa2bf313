use std::fmt;

/// Validation failures raised by configuration setters.
///
/// Every setter checks its argument before touching state, so a raised
/// error always leaves the previous valid value in effect. Redundant
/// voice lifecycle calls (double note-on, note-off while idle) are
/// normal control flow, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ChordboardError {
    /// A numeric setting was not finite or fell outside its range.
    InvalidNumber { what: &'static str, value: f64 },
    /// A waveform name outside the closed set.
    InvalidWaveType { value: String },
    /// A tuning-system name other than the three supported systems.
    InvalidTuningSystem { value: String },
    /// A pitch class outside [0, 11].
    InvalidNote { value: i32 },
}

impl fmt::Display for ChordboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordboardError::InvalidNumber { what, value } => {
                write!(f, "Invalid number for {what}: {value}")
            }
            ChordboardError::InvalidWaveType { value } => {
                write!(f, "Invalid wave type '{value}'")
            }
            ChordboardError::InvalidTuningSystem { value } => {
                write!(f, "Invalid tuning system '{value}'")
            }
            ChordboardError::InvalidNote { value } => {
                write!(f, "Invalid note {value}: pitch class must be in 0..=11")
            }
        }
    }
}

impl std::error::Error for ChordboardError {}
