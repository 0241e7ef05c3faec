//! Audio Buffer Management
//!
//! Provides the mono sample buffer passed between synthesis stages.
//! All processing runs at 44.1kHz/32-bit float.

use crate::error::{Result, SynthError};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate for all synthesis and encoding (44.1kHz)
pub const SAMPLE_RATE: u32 = 44100;

/// Hard cap on requested duration (10 hours)
pub const MAX_DURATION_SECS: f64 = 36000.0;

/// Number of samples for a duration at the engine sample rate
///
/// Always `round(duration_secs * 44100)`.
#[inline]
pub fn num_samples_for(duration_secs: f64) -> usize {
    (duration_secs * SAMPLE_RATE as f64).round() as usize
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Mono audio buffer produced by one synthesis request
///
/// Samples are nominally in [-1, 1]; only normalized buffers are
/// guaranteed to stay inside that range.
///
/// # Example
/// ```
/// use ambient_synth::engine::buffer::{AudioBuffer, SAMPLE_RATE};
///
/// let buffer = AudioBuffer::silence(SAMPLE_RATE as usize);
/// assert_eq!(buffer.len(), 44100);
/// assert_eq!(buffer.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a zeroed buffer of `num_samples` at the engine sample rate
    pub fn silence(num_samples: usize) -> Self {
        Self {
            samples: vec![0.0; num_samples],
            sample_rate: SAMPLE_RATE,
        }
    }

    /// Wrap existing samples at the engine sample rate
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
        }
    }

    /// Wrap existing samples at an explicit sample rate
    ///
    /// Only used for decoded input; the engine itself never changes rate.
    pub fn with_sample_rate(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SynthError::InvalidRequest {
                reason: "sample rate must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Get the number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Borrow the samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Borrow the samples mutably
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume the buffer and return its samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Peak absolute amplitude (0.0 for empty buffers)
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// True when every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// Check the buffer contains only finite samples
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// True if this buffer can be mixed sample-for-sample with `other`
    pub fn is_compatible_with(&self, other: &AudioBuffer) -> bool {
        self.len() == other.len() && self.sample_rate == other.sample_rate
    }
}

// ============================================================================
// Tests
// ============================================================================
