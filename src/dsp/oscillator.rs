//! Anti-aliased tone generator using PolyBLEP.
//!
//! One generator is created per key press and discarded on release; it
//! is never restarted. Frequency is set at creation, detune (in cents)
//! and waveform may be mutated while the generator runs.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::ChordboardError;

/// Supported waveform shapes.
///
/// `Custom` plays a host-installed single-cycle wavetable and falls back
/// to a sine when none has been provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Custom,
}

impl Waveform {
    /// Parse the wire / settings name of a waveform.
    pub fn parse(name: &str) -> Result<Self, ChordboardError> {
        match name {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            "custom" => Ok(Waveform::Custom),
            other => Err(ChordboardError::InvalidWaveType {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Custom => "custom",
        }
    }
}

/// A band-limited oscillator with anti-aliasing (PolyBLEP).
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f64,
    /// Micro-tuning offset in cents.
    pub detune: f64,
    /// Single-cycle table for [`Waveform::Custom`], shared across voices.
    pub custom_table: Option<Arc<[f64]>>,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            detune: 0.0,
            custom_table: None,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Effective frequency accounting for detune (in cents).
    fn effective_freq(&self) -> f64 {
        self.frequency * (self.detune / 1200.0).exp2()
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.effective_freq() / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc();
        let sample = match self.waveform {
            Waveform::Sine => self.sine(),
            Waveform::Sawtooth => self.sawtooth(inc),
            Waveform::Square => self.square(inc),
            Waveform::Triangle => self.triangle(),
            Waveform::Custom => self.custom(),
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn sine(&self) -> f64 {
        (2.0 * PI * self.phase).sin()
    }

    /// Naive sawtooth rising -1 to +1; PolyBLEP corrects the wrap.
    fn sawtooth(&self, inc: f64) -> f64 {
        let naive = 2.0 * self.phase - 1.0;
        naive - poly_blep(self.phase, inc)
    }

    /// Square wave with PolyBLEP at both edges.
    fn square(&self, inc: f64) -> f64 {
        let mut value = if self.phase < 0.5 { 1.0 } else { -1.0 };
        value += poly_blep(self.phase, inc);
        value -= poly_blep((self.phase + 0.5) % 1.0, inc);
        value
    }

    /// Piecewise-linear triangle: -1→+1 over [0, 0.5], +1→-1 over [0.5, 1].
    fn triangle(&self) -> f64 {
        if self.phase < 0.5 {
            4.0 * self.phase - 1.0
        } else {
            3.0 - 4.0 * self.phase
        }
    }

    fn custom(&self) -> f64 {
        match &self.custom_table {
            Some(table) if !table.is_empty() => {
                let index = (self.phase * table.len() as f64) as usize % table.len();
                table[index]
            }
            _ => self.sine(),
        }
    }
}

/// PolyBLEP (Polynomial Band-Limited Step) anti-aliasing correction.
///
/// `t` is the phase [0, 1), `dt` the phase increment per sample. Returns
/// the correction to apply at a waveform discontinuity.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_starts_near_zero() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        let sample = osc.next_sample();
        assert!(sample.abs() < 1e-10, "sine should start near 0, got {sample}");
    }

    #[test]
    fn all_waveforms_stay_bounded() {
        for wf in [
            Waveform::Sine,
            Waveform::Square,
            Waveform::Sawtooth,
            Waveform::Triangle,
            Waveform::Custom,
        ] {
            let mut osc = Oscillator::new(wf, 440.0, 44100.0);
            for _ in 0..44100 {
                let s = osc.next_sample();
                assert!(s.abs() <= 1.5, "{wf:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn detune_of_one_octave_doubles_phase_inc() {
        let flat = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        let mut sharp = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        sharp.detune = 1200.0;
        assert!((sharp.phase_inc() - 2.0 * flat.phase_inc()).abs() < 1e-10);
    }

    #[test]
    fn custom_without_table_falls_back_to_sine() {
        let mut custom = Oscillator::new(Waveform::Custom, 440.0, 44100.0);
        let mut sine = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        for _ in 0..1000 {
            assert_eq!(custom.next_sample(), sine.next_sample());
        }
    }

    #[test]
    fn custom_reads_installed_table() {
        let mut osc = Oscillator::new(Waveform::Custom, 440.0, 44100.0);
        osc.custom_table = Some(vec![0.25; 64].into());
        assert_eq!(osc.next_sample(), 0.25);
    }

    #[test]
    fn waveform_names_round_trip() {
        for name in ["sine", "square", "sawtooth", "triangle", "custom"] {
            assert_eq!(Waveform::parse(name).unwrap().as_str(), name);
        }
        assert!(matches!(
            Waveform::parse("pulse"),
            Err(ChordboardError::InvalidWaveType { .. })
        ));
    }
}
