//! Composite soundscapes built from noise and tone layers
//!
//! Each recipe generates its layers at the same length, mixes them with the
//! weights from the [`PresetTable`](super::presets::PresetTable) and
//! normalizes the result. Every layer draws from its own forked
//! [`RandomSource`], in a fixed order, so a seed fully determines the output.

use tracing::debug;

use super::noise::{brown_noise, pink_noise, white_noise, BrownNoise, PinkNoise, WhiteNoise};
use super::presets::{ForestChirps, OceanMix, RainMix};
use super::random::RandomSource;
use super::source::{scan_peak, SampleSource};
use super::tone::{sine_wave, EnvelopeCurve, Partial, ToneOscillator};
use crate::dsp::{mix_normalized, normalize, scale_by_peak, MixLayer};
use crate::engine::buffer::num_samples_for;
use crate::engine::AudioBuffer;
use crate::error::Result;

// ============================================================================
// Rain
// ============================================================================

/// Rain: white noise over normalized brown noise
pub fn rain(num_samples: usize, rng: &mut RandomSource, weights: RainMix) -> Result<AudioBuffer> {
    let white = white_noise(num_samples, rng.fork());
    let brown = brown_noise(num_samples, rng.fork());
    mix_normalized(&[
        MixLayer::new(&white, weights.white_gain),
        MixLayer::new(&brown, weights.brown_gain),
    ])
}

/// Streaming form of [`rain`] (before the final normalization)
///
/// Construction scans the brown layer once to learn its peak.
#[derive(Debug, Clone)]
pub struct RainSource {
    white: WhiteNoise,
    brown: BrownNoise,
    brown_peak: f32,
    weights: RainMix,
}

impl RainSource {
    pub fn new(
        num_samples: usize,
        rng: &mut RandomSource,
        weights: RainMix,
        chunk_samples: usize,
    ) -> Self {
        let white = WhiteNoise::new(rng.fork());
        let brown = BrownNoise::new(rng.fork());
        let brown_peak = scan_peak(&mut brown.clone(), num_samples, chunk_samples);
        Self {
            white,
            brown,
            brown_peak,
            weights,
        }
    }
}

impl SampleSource for RainSource {
    fn next_sample(&mut self) -> f32 {
        let w = self.white.next_sample();
        let b = scale_by_peak(self.brown.next_sample(), self.brown_peak);
        let mut acc = 0.0_f32;
        acc += self.weights.white_gain * w;
        acc += self.weights.brown_gain * b;
        acc
    }
}

// ============================================================================
// Ocean
// ============================================================================

/// Ocean waves: a slow sine swell over pink noise
pub fn ocean_waves(
    num_samples: usize,
    rng: &mut RandomSource,
    weights: OceanMix,
) -> Result<AudioBuffer> {
    let swell = sine_wave(weights.swell_hz, weights.swell_amplitude, num_samples);
    let pink = pink_noise(num_samples, rng.fork());
    mix_normalized(&[
        MixLayer::new(&swell, weights.swell_gain),
        MixLayer::new(&pink, weights.pink_gain),
    ])
}

/// Streaming form of [`ocean_waves`] (before the final normalization)
#[derive(Debug, Clone)]
pub struct OceanSource {
    swell: ToneOscillator,
    pink: PinkNoise,
    weights: OceanMix,
}

impl OceanSource {
    pub fn new(rng: &mut RandomSource, weights: OceanMix) -> Self {
        Self {
            swell: ToneOscillator::sine(weights.swell_hz, weights.swell_amplitude),
            pink: PinkNoise::new(rng.fork()),
            weights,
        }
    }
}

impl SampleSource for OceanSource {
    fn next_sample(&mut self) -> f32 {
        let s = self.swell.next_sample();
        let p = self.pink.next_sample();
        let mut acc = 0.0_f32;
        acc += self.weights.swell_gain * s;
        acc += self.weights.pink_gain * p;
        acc
    }
}

// ============================================================================
// Forest
// ============================================================================

/// Forest output along with where the chirps landed
#[derive(Debug, Clone)]
pub struct ForestRender {
    pub buffer: AudioBuffer,
    /// Start sample of each chirp, in placement order
    pub chirp_offsets: Vec<usize>,
}

/// One chirp: a sine burst under an exponential decay
pub fn chirp(params: &ForestChirps) -> Vec<f32> {
    let len = num_samples_for(params.chirp_secs);
    let mut burst = ToneOscillator::new(
        vec![Partial::new(params.chirp_hz, params.chirp_gain)],
        EnvelopeCurve::ExponentialDecay {
            rate: params.decay_rate,
            retrigger_secs: None,
        },
    );
    burst.render(len)
}

/// Number of chirps for a duration: `round(duration / secs_per_chirp)`
///
/// Zero when the buffer is not longer than a single chirp.
pub fn chirp_count(duration_secs: f64, num_samples: usize, params: &ForestChirps) -> usize {
    if num_samples <= num_samples_for(params.chirp_secs) {
        return 0;
    }
    (duration_secs / params.secs_per_chirp).round() as usize
}

/// Forest: white noise with chirps added at uniform random offsets
///
/// Offsets are drawn from `[0, N - chirp_len)`; overlapping chirps sum.
pub fn forest(
    duration_secs: f64,
    num_samples: usize,
    rng: &mut RandomSource,
    params: ForestChirps,
) -> ForestRender {
    let mut noise = white_noise(num_samples, rng.fork());
    let mut placement = rng.fork();

    let burst = chirp(&params);
    let count = chirp_count(duration_secs, num_samples, &params);
    let mut chirp_offsets = Vec::with_capacity(count);

    if count > 0 {
        let span = num_samples - burst.len();
        let samples = noise.samples_mut();
        for _ in 0..count {
            let start = placement.next_index(span);
            for (dst, &src) in samples[start..start + burst.len()].iter_mut().zip(&burst) {
                *dst += src;
            }
            chirp_offsets.push(start);
        }
    }

    debug!(
        chirps = chirp_offsets.len(),
        chirp_samples = burst.len(),
        "placed forest chirps"
    );

    ForestRender {
        buffer: normalize(noise),
        chirp_offsets,
    }
}
