//! Noise generators: white, pink and brown
//!
//! Pink noise colors white noise with a fixed 4-tap recursive filter.
//! Brown noise integrates white noise with an `f64` accumulator so that
//! multi-hour renders do not drift from rounding.

use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use super::source::SampleSource;
use crate::dsp::normalize;
use crate::engine::AudioBuffer;

/// Feed-forward coefficients of the pink filter
pub const PINK_B: [f64; 4] = [0.049922035, -0.095993537, 0.050612699, -0.004408786];

/// Feedback coefficients of the pink filter (`a[0]` is 1)
pub const PINK_A: [f64; 4] = [1.0, -2.494956002, 2.017265875, -0.522189400];

// ============================================================================
// White
// ============================================================================

/// Uniform white noise in [-1, 1]
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    rng: RandomSource,
}

impl WhiteNoise {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }
}

impl SampleSource for WhiteNoise {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        self.rng.next_uniform()
    }
}

/// `num_samples` of white noise
pub fn white_noise(num_samples: usize, rng: RandomSource) -> AudioBuffer {
    AudioBuffer::from_samples(WhiteNoise::new(rng).render(num_samples))
}

// ============================================================================
// Pink
// ============================================================================

/// History of the pink filter: last three inputs and outputs
///
/// Index 0 is the most recent sample. A fresh state is all zeros, which is
/// how samples before the start of a buffer are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub inputs: [f64; 3],
    pub outputs: [f64; 3],
}

/// Causal pink-coloring filter with carried state
#[derive(Debug, Clone, Default)]
pub struct PinkFilter {
    state: FilterState,
}

impl PinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured state
    pub fn from_state(state: FilterState) -> Self {
        Self { state }
    }

    /// Current filter history, for persisting a chunked render
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Filter one sample
    ///
    /// `y[i] = Σ b[k]·x[i-k] − Σ_{k≥1} a[k]·y[i-k]`
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let FilterState { inputs: x, outputs: y } = self.state;

        let output = PINK_B[0] * input + PINK_B[1] * x[0] + PINK_B[2] * x[1] + PINK_B[3] * x[2]
            - PINK_A[1] * y[0]
            - PINK_A[2] * y[1]
            - PINK_A[3] * y[2];

        self.state.inputs = [input, x[0], x[1]];
        self.state.outputs = [output, y[0], y[1]];
        output
    }

    /// Filter a block of samples, continuing from the carried state
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process(*x as f64) as f32;
        }
    }

    /// Reset the history to zeros
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }
}

/// Pink noise: white noise through [`PinkFilter`]
#[derive(Debug, Clone)]
pub struct PinkNoise {
    white: WhiteNoise,
    filter: PinkFilter,
}

impl PinkNoise {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            white: WhiteNoise::new(rng),
            filter: PinkFilter::new(),
        }
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }
}

impl SampleSource for PinkNoise {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let x = self.white.next_sample();
        self.filter.process(x as f64) as f32
    }
}

/// `num_samples` of pink noise (not normalized)
pub fn pink_noise(num_samples: usize, rng: RandomSource) -> AudioBuffer {
    AudioBuffer::from_samples(PinkNoise::new(rng).render(num_samples))
}

/// Apply the pink filter to an arbitrary input sequence from zero state
pub fn pink_filter(input: &[f32]) -> Vec<f32> {
    let mut output = vec![0.0; input.len()];
    PinkFilter::new().process_block(input, &mut output);
    output
}

// ============================================================================
// Brown
// ============================================================================

/// Running integral of white noise (unnormalized)
#[derive(Debug, Clone)]
pub struct BrownNoise {
    white: WhiteNoise,
    accumulator: f64,
}

impl BrownNoise {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            white: WhiteNoise::new(rng),
            accumulator: 0.0,
        }
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }
}

impl SampleSource for BrownNoise {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        self.accumulator += self.white.next_sample() as f64;
        self.accumulator as f32
    }
}

/// `num_samples` of brown noise, normalized by its own peak
pub fn brown_noise(num_samples: usize, rng: RandomSource) -> AudioBuffer {
    normalize(AudioBuffer::from_samples(
        BrownNoise::new(rng).render(num_samples),
    ))
}
