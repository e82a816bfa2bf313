//! Per-key voice lifecycle.
//!
//! Each key slot owns a gain stage that is created once and reused for
//! every press, and a one-shot generator that exists only while the key
//! is down. A slot is Sounding exactly while it owns a generator;
//! redundant note-on/note-off calls are absorbed silently so overlapping
//! input sources (mouse drag plus held PC key) cannot double-start or
//! double-stop a voice.

use std::sync::Arc;

use super::oscillator::{Oscillator, Waveform};

/// Reusable per-slot gain stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Gain {
    pub level: f64,
}

/// One key slot's audio resources.
#[derive(Debug, Clone, Default)]
struct Voice {
    /// Created lazily on the first press, then kept for reuse.
    gain: Option<Gain>,
    /// Present exactly while the slot is Sounding. Generators are
    /// one-shot: dropped on release, recreated on the next press.
    generator: Option<Oscillator>,
}

/// All voices of one keyboard, plus the master gain they mix into.
#[derive(Debug, Clone)]
pub struct VoiceBank {
    voices: Vec<Voice>,
    sample_rate: f64,
    master_volume: f64,
    voice_volume: f64,
    custom_table: Option<Arc<[f64]>>,
}

impl VoiceBank {
    pub fn new(slots: usize, sample_rate: f64) -> Self {
        VoiceBank {
            voices: vec![Voice::default(); slots],
            sample_rate,
            master_volume: 0.5,
            voice_volume: 0.5,
            custom_table: None,
        }
    }

    pub fn is_sounding(&self, slot: usize) -> bool {
        self.voices.get(slot).is_some_and(|v| v.generator.is_some())
    }

    /// Number of slots currently Sounding.
    pub fn sounding_count(&self) -> usize {
        self.voices.iter().filter(|v| v.generator.is_some()).count()
    }

    /// Whether the slot's gain stage has been created yet (it survives
    /// across press/release cycles).
    pub fn has_gain(&self, slot: usize) -> bool {
        self.voices.get(slot).is_some_and(|v| v.gain.is_some())
    }

    /// Start the slot's voice. No-op when already Sounding.
    pub fn note_on(&mut self, slot: usize, frequency: f64, detune: f64, waveform: Waveform) {
        let voice_volume = self.voice_volume;
        let sample_rate = self.sample_rate;
        let custom_table = self.custom_table.clone();
        let Some(voice) = self.voices.get_mut(slot) else {
            return;
        };
        if voice.generator.is_some() {
            return;
        }
        if voice.gain.is_none() {
            voice.gain = Some(Gain { level: voice_volume });
        }
        let mut osc = Oscillator::new(waveform, frequency, sample_rate);
        osc.detune = detune;
        osc.custom_table = custom_table;
        voice.generator = Some(osc);
        log::debug!("voice {slot} on: {frequency:.3} Hz {detune:+.1}c {}", waveform.as_str());
    }

    /// Stop the slot's voice, discarding its generator but keeping the
    /// gain stage. No-op when Idle, including when no gain exists yet.
    pub fn note_off(&mut self, slot: usize) {
        let Some(voice) = self.voices.get_mut(slot) else {
            return;
        };
        if voice.generator.take().is_some() {
            log::debug!("voice {slot} off");
        }
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    /// Applies immediately; the master gain sits after the voice mix.
    pub fn set_master_volume(&mut self, level: f64) {
        self.master_volume = level;
    }

    pub fn voice_volume(&self) -> f64 {
        self.voice_volume
    }

    /// Applies immediately to every existing gain stage, without
    /// interrupting sound, and to gains created later.
    pub fn set_voice_volume(&mut self, level: f64) {
        self.voice_volume = level;
        for voice in &mut self.voices {
            if let Some(gain) = &mut voice.gain {
                gain.level = level;
            }
        }
    }

    /// Retarget every live generator's waveform in place.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            if let Some(osc) = &mut voice.generator {
                osc.waveform = waveform;
            }
        }
    }

    /// Re-tune a live generator (after a root or temperament change).
    pub fn set_detune(&mut self, slot: usize, cents: f64) {
        if let Some(osc) = self.voices.get_mut(slot).and_then(|v| v.generator.as_mut()) {
            osc.detune = cents;
        }
    }

    /// Install the single-cycle table used by [`Waveform::Custom`],
    /// for live generators as well as future onsets.
    pub fn set_custom_wavetable(&mut self, table: Vec<f64>) {
        let table: Arc<[f64]> = table.into();
        for voice in &mut self.voices {
            if let Some(osc) = &mut voice.generator {
                osc.custom_table = Some(table.clone());
            }
        }
        self.custom_table = Some(table);
    }

    /// Render the next `out.len()` mono samples, summing every Sounding
    /// voice through its gain and the master gain. The external audio
    /// clock (AudioWorklet, cpal callback) pulls this; the core never
    /// blocks on it.
    pub fn render(&mut self, out: &mut [f64]) {
        for frame in out.iter_mut() {
            let mut mix = 0.0;
            for voice in &mut self.voices {
                if let (Some(osc), Some(gain)) = (&mut voice.generator, &voice.gain) {
                    mix += osc.next_sample() * gain.level;
                }
            }
            *frame = soft_clip(mix * self.master_volume);
        }
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}
