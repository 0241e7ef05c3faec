//! Sine tone synthesis with optional envelope shaping

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::source::SampleSource;
use crate::dsp::normalize;
use crate::engine::buffer::SAMPLE_RATE;
use crate::engine::AudioBuffer;

/// One additive sine component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    pub frequency_hz: f64,
    pub gain: f64,
}

impl Partial {
    pub const fn new(frequency_hz: f64, gain: f64) -> Self {
        Self { frequency_hz, gain }
    }
}

/// Amplitude multiplier as a function of elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvelopeCurve {
    /// No shaping
    #[default]
    Constant,
    /// `exp(-rate · t)`, restarting every `retrigger_secs` when set
    ExponentialDecay {
        rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retrigger_secs: Option<f64>,
    },
}

impl EnvelopeCurve {
    /// Envelope value at `t` seconds from buffer start
    #[inline]
    pub fn gain_at(&self, t: f64) -> f64 {
        match *self {
            EnvelopeCurve::Constant => 1.0,
            EnvelopeCurve::ExponentialDecay {
                rate,
                retrigger_secs,
            } => {
                let local = match retrigger_secs {
                    Some(period) if period > 0.0 => t.rem_euclid(period),
                    _ => t,
                };
                (-rate * local).exp()
            }
        }
    }

    /// Sampled envelope of `num_samples` at the engine rate
    pub fn sample(&self, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| self.gain_at(i as f64 / SAMPLE_RATE as f64) as f32)
            .collect()
    }
}

/// Additive sine oscillator over a half-open time grid `t = i / rate`
#[derive(Debug, Clone)]
pub struct ToneOscillator {
    partials: Vec<Partial>,
    envelope: EnvelopeCurve,
    index: u64,
}

impl ToneOscillator {
    pub fn new(partials: Vec<Partial>, envelope: EnvelopeCurve) -> Self {
        Self {
            partials,
            envelope,
            index: 0,
        }
    }

    /// Single sine at `frequency_hz` with `gain`
    pub fn sine(frequency_hz: f64, gain: f64) -> Self {
        Self::new(vec![Partial::new(frequency_hz, gain)], EnvelopeCurve::Constant)
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    /// Value at an absolute sample index
    #[inline]
    pub fn value_at(&self, index: u64) -> f32 {
        let t = index as f64 / SAMPLE_RATE as f64;
        let sum: f64 = self
            .partials
            .iter()
            .map(|p| p.gain * (2.0 * PI * p.frequency_hz * t).sin())
            .sum();
        (sum * self.envelope.gain_at(t)) as f32
    }
}

impl SampleSource for ToneOscillator {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let value = self.value_at(self.index);
        self.index += 1;
        value
    }
}

/// `gain · sin(2π·f·t)` for `num_samples`, not normalized
pub fn sine_wave(frequency_hz: f64, gain: f64, num_samples: usize) -> AudioBuffer {
    AudioBuffer::from_samples(ToneOscillator::sine(frequency_hz, gain).render(num_samples))
}

/// Sum of partials with an envelope, normalized by peak
pub fn multi_tone(partials: &[Partial], envelope: EnvelopeCurve, num_samples: usize) -> AudioBuffer {
    let mut osc = ToneOscillator::new(partials.to_vec(), envelope);
    normalize(AudioBuffer::from_samples(osc.render(num_samples)))
}
