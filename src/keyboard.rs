//! The keyboard core: key-state registry and orchestration.
//!
//! Every external press/release lands here. The registry updates the
//! key's state, resynchronizes voices against the full state array, and
//! then runs chord inference exactly once on the settled snapshot, in
//! that order. All methods take `&mut self`, so a single-threaded host
//! dispatch (the browser event loop) gives the ordering guarantee for
//! free; a multi-threaded host must serialize calls itself.

use crate::chord;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::VoiceBank;
use crate::error::ChordboardError;
use crate::tuning::{Tuning, TuningSystem};

/// Number of playable key slots (two octaves plus the octave note).
pub const KEY_COUNT: usize = 25;

/// Pressed/released state of one key slot. Binary even when several
/// input sources hold the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Released,
    Pressed,
}

/// One virtual keyboard instance: key states, tuning and voices.
#[derive(Debug, Clone)]
pub struct Keyboard {
    states: Vec<KeyState>,
    tuning: Tuning,
    bank: VoiceBank,
    waveform: Waveform,
}

impl Keyboard {
    pub fn new(sample_rate: f64) -> Self {
        Keyboard {
            states: vec![KeyState::Released; KEY_COUNT],
            tuning: Tuning::default(),
            bank: VoiceBank::new(KEY_COUNT, sample_rate),
            waveform: Waveform::Sine,
        }
    }

    // ── input contract ──────────────────────────────────────────

    /// A key slot went down. Slots outside the keyboard are ignored,
    /// like unmapped PC keys in the input adapter.
    pub fn note_pressed(&mut self, slot: usize) {
        if slot >= KEY_COUNT {
            log::warn!("ignoring press of unknown slot {slot}");
            return;
        }
        self.states[slot] = KeyState::Pressed;
        self.update();
    }

    /// A key slot went up.
    pub fn note_released(&mut self, slot: usize) {
        if slot >= KEY_COUNT {
            return;
        }
        self.states[slot] = KeyState::Released;
        self.update();
    }

    /// Resynchronize voices with the key states, then infer the chord
    /// root from the settled snapshot.
    fn update(&mut self) {
        for slot in 0..KEY_COUNT {
            match self.states[slot] {
                KeyState::Pressed if !self.bank.is_sounding(slot) => {
                    let freq = self.tuning.pitch(slot as i32);
                    let detune = self.tuning.detune_cents(slot as i32);
                    self.bank.note_on(slot, freq, detune, self.waveform);
                }
                KeyState::Released if self.bank.is_sounding(slot) => {
                    self.bank.note_off(slot);
                }
                _ => {}
            }
        }
        self.chord_check();
    }

    /// Adopt a newly inferred chord root, if any. Funnels through the
    /// same validated setter as explicit user selection.
    fn chord_check(&mut self) {
        let Some(root) = chord::infer_root(&self.states) else {
            return;
        };
        // Inferred roots are pitch classes by construction.
        if self.set_root_pitch_class(i32::from(root)).is_ok() {
            log::info!("chord root adopted: {root}");
        }
    }

    /// Push the current per-degree detunes into live generators, so held
    /// notes re-tune audibly when the root or temperament changes.
    fn refresh_detune(&mut self) {
        for slot in 0..KEY_COUNT {
            self.bank.set_detune(slot, self.tuning.detune_cents(slot as i32));
        }
    }

    // ── configuration setters (fail fast, no partial update) ────

    pub fn set_master_volume(&mut self, level: f64) -> Result<(), ChordboardError> {
        check_volume("master volume", level)?;
        self.bank.set_master_volume(level);
        Ok(())
    }

    pub fn set_voice_volume(&mut self, level: f64) -> Result<(), ChordboardError> {
        check_volume("voice volume", level)?;
        self.bank.set_voice_volume(level);
        Ok(())
    }

    /// Applies to live generators immediately and to future onsets.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.bank.set_waveform(waveform);
    }

    /// Set the reference pitch (A4) in Hz. Takes effect on the next
    /// onset; running generators keep the frequency they started with.
    pub fn set_reference_pitch(&mut self, hz: f64) -> Result<(), ChordboardError> {
        self.tuning.set_a4(hz)
    }

    pub fn set_tuning_system(&mut self, system: TuningSystem) {
        self.tuning.set_system(system);
        self.refresh_detune();
    }

    /// Explicitly select the harmonic root (the same path chord
    /// inference uses).
    pub fn set_root_pitch_class(&mut self, pitch_class: i32) -> Result<(), ChordboardError> {
        self.tuning.set_root(pitch_class)?;
        self.refresh_detune();
        Ok(())
    }

    /// Install the single-cycle table for the `custom` waveform.
    pub fn set_custom_wavetable(&mut self, table: Vec<f64>) {
        self.bank.set_custom_wavetable(table);
    }

    // ── output contract ─────────────────────────────────────────

    /// Detune of a slot in cents, rounded to one decimal for display.
    pub fn detune_display(&self, slot: usize) -> f64 {
        (self.tuning.detune_cents(slot as i32) * 10.0).round() / 10.0
    }

    /// Current root pitch class, for key highlighting.
    pub fn root(&self) -> u8 {
        self.tuning.root()
    }

    /// How many keys are currently held.
    pub fn pressed_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == KeyState::Pressed)
            .count()
    }

    pub fn is_pressed(&self, slot: usize) -> bool {
        self.states.get(slot).copied() == Some(KeyState::Pressed)
    }

    pub fn is_sounding(&self, slot: usize) -> bool {
        self.bank.is_sounding(slot)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn reference_pitch(&self) -> f64 {
        self.tuning.a4()
    }

    pub fn tuning_system(&self) -> TuningSystem {
        self.tuning.system()
    }

    pub fn master_volume(&self) -> f64 {
        self.bank.master_volume()
    }

    pub fn voice_volume(&self) -> f64 {
        self.bank.voice_volume()
    }

    /// Frequency a slot sounds at (before detune), in Hz.
    pub fn pitch(&self, slot: usize) -> f64 {
        self.tuning.pitch(slot as i32)
    }

    /// Render the next block of mono samples for the host audio clock.
    pub fn render(&mut self, out: &mut [f64]) {
        self.bank.render(out);
    }
}

fn check_volume(what: &'static str, level: f64) -> Result<(), ChordboardError> {
    if level.is_finite() && (0.0..=10.0).contains(&level) {
        Ok(())
    } else {
        log::warn!("rejected {what} {level}");
        Err(ChordboardError::InvalidNumber { what, value: level })
    }
}
