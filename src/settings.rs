//! Persisted settings.
//!
//! Only two values survive a restart: the waveform name and the
//! reference pitch. The host keeps them in a string-typed key-value
//! store (localStorage), so both are carried as strings here, with
//! numbers as decimal text.

use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::keyboard::Keyboard;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "waveType")]
    pub wave_type: String,
    #[serde(rename = "A4")]
    pub a4: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            wave_type: "sine".to_string(),
            a4: "440".to_string(),
        }
    }
}

impl Settings {
    /// Capture the persistable values of a keyboard.
    pub fn snapshot(keyboard: &Keyboard) -> Self {
        Settings {
            wave_type: keyboard.waveform().as_str().to_string(),
            a4: keyboard.reference_pitch().to_string(),
        }
    }

    /// Apply stored values to a keyboard. A value that fails to parse or
    /// validate falls back to the default; startup must not fail on a
    /// corrupt store.
    pub fn apply(&self, keyboard: &mut Keyboard) {
        match Waveform::parse(&self.wave_type) {
            Ok(waveform) => keyboard.set_waveform(waveform),
            Err(e) => {
                log::warn!("stored waveform ignored: {e}");
                keyboard.set_waveform(Waveform::Sine);
            }
        }
        let a4 = self.a4.parse::<f64>().unwrap_or(440.0);
        if keyboard.set_reference_pitch(a4).is_err() {
            log::warn!("stored reference pitch {a4} ignored");
            // Default is already in range; the keyboard keeps it.
        }
    }

    pub fn to_json(&self) -> String {
        // Two plain string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_default()
    }
}
