pub mod chord;
pub mod dsp;
pub mod error;
pub mod keyboard;
pub mod settings;
pub mod tuning;

use wasm_bindgen::prelude::*;

use crate::dsp::oscillator::Waveform;
use crate::keyboard::Keyboard;
use crate::settings::Settings;
use crate::tuning::TuningSystem;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the chordboard-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed handle around one [`Keyboard`] instance.
///
/// The browser UI forwards key presses/releases and settings changes
/// here, reads back detune/root/pressed-count for display, and pulls
/// rendered samples from an AudioWorklet.
#[wasm_bindgen]
pub struct ChordBoard {
    inner: Keyboard,
}

#[wasm_bindgen]
impl ChordBoard {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> ChordBoard {
        ChordBoard {
            inner: Keyboard::new(sample_rate),
        }
    }

    pub fn note_pressed(&mut self, slot: usize) {
        self.inner.note_pressed(slot);
    }

    pub fn note_released(&mut self, slot: usize) {
        self.inner.note_released(slot);
    }

    pub fn set_master_volume(&mut self, level: f64) -> Result<(), JsValue> {
        self.inner
            .set_master_volume(level)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn set_voice_volume(&mut self, level: f64) -> Result<(), JsValue> {
        self.inner
            .set_voice_volume(level)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn set_waveform(&mut self, name: &str) -> Result<(), JsValue> {
        let waveform =
            Waveform::parse(name).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.inner.set_waveform(waveform);
        Ok(())
    }

    pub fn set_reference_pitch(&mut self, hz: f64) -> Result<(), JsValue> {
        self.inner
            .set_reference_pitch(hz)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn set_tuning_system(&mut self, name: &str) -> Result<(), JsValue> {
        let system =
            TuningSystem::parse(name).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.inner.set_tuning_system(system);
        Ok(())
    }

    pub fn set_root(&mut self, pitch_class: i32) -> Result<(), JsValue> {
        self.inner
            .set_root_pitch_class(pitch_class)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Install the single-cycle table for the `custom` waveform.
    pub fn set_custom_wavetable(&mut self, table: Vec<f64>) {
        self.inner.set_custom_wavetable(table);
    }

    /// Detune of a slot in cents, rounded to one decimal.
    pub fn detune_display(&self, slot: usize) -> f64 {
        self.inner.detune_display(slot)
    }

    /// Current root pitch class, for key highlighting.
    pub fn root(&self) -> u8 {
        self.inner.root()
    }

    pub fn pressed_count(&self) -> usize {
        self.inner.pressed_count()
    }

    /// Render the next `num_samples` mono samples for AudioWorklet
    /// playback.
    pub fn render(&mut self, num_samples: usize) -> Vec<f32> {
        let mut out = vec![0.0f64; num_samples];
        self.inner.render(&mut out);
        out.iter().map(|&s| s as f32).collect()
    }

    /// Snapshot the persistable settings as a JS object.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&Settings::snapshot(&self.inner))
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Restore persisted settings from a JS object; invalid stored
    /// values fall back to defaults.
    pub fn load_settings(&mut self, value: JsValue) -> Result<(), JsValue> {
        let settings: Settings = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        settings.apply(&mut self.inner);
        Ok(())
    }
}
