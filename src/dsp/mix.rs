//! Mixer and peak normalizer
//!
//! Composite recipes are weighted sums of layers, always followed by
//! peak normalization to [-1, 1].

use crate::engine::AudioBuffer;
use crate::error::{Result, SynthError};

/// One weighted input to a mix
#[derive(Debug, Clone, Copy)]
pub struct MixLayer<'a> {
    pub buffer: &'a AudioBuffer,
    pub gain: f32,
}

impl<'a> MixLayer<'a> {
    pub fn new(buffer: &'a AudioBuffer, gain: f32) -> Self {
        Self { buffer, gain }
    }
}

/// Scale one sample by a buffer peak, leaving it untouched for silent buffers
///
/// Shared by the in-memory normalizer and the streaming renderer so both
/// produce identical samples.
#[inline]
pub fn scale_by_peak(sample: f32, peak: f32) -> f32 {
    if peak > 0.0 {
        sample / peak
    } else {
        sample
    }
}

/// Normalize a buffer in place so its peak absolute amplitude is 1.0
///
/// An all-zero buffer is returned unchanged. Returns the peak that was
/// divided out.
pub fn normalize_in_place(buffer: &mut AudioBuffer) -> f32 {
    let peak = buffer.peak();
    if peak > 0.0 {
        for sample in buffer.samples_mut() {
            *sample = scale_by_peak(*sample, peak);
        }
    }
    peak
}

/// Normalize a buffer, consuming it
pub fn normalize(mut buffer: AudioBuffer) -> AudioBuffer {
    normalize_in_place(&mut buffer);
    buffer
}

/// Weighted sum of layers: `Σ gain · buffer`
///
/// All layers must share length and sample rate. The result is not
/// normalized; callers follow up with [`normalize`].
pub fn mix(layers: &[MixLayer<'_>]) -> Result<AudioBuffer> {
    let first = layers.first().ok_or_else(|| SynthError::InvalidRequest {
        reason: "mix requires at least one layer".to_string(),
    })?;

    if let Some(mismatch) = layers
        .iter()
        .find(|layer| !layer.buffer.is_compatible_with(first.buffer))
    {
        return Err(SynthError::InvalidRequest {
            reason: format!(
                "mix layers differ: {} samples @ {} Hz vs {} samples @ {} Hz",
                first.buffer.len(),
                first.buffer.sample_rate(),
                mismatch.buffer.len(),
                mismatch.buffer.sample_rate()
            ),
        });
    }

    let mut out = vec![0.0_f32; first.buffer.len()];
    for layer in layers {
        for (acc, &sample) in out.iter_mut().zip(layer.buffer.samples()) {
            *acc += layer.gain * sample;
        }
    }

    AudioBuffer::with_sample_rate(out, first.buffer.sample_rate())
}

/// Mix then normalize
pub fn mix_normalized(layers: &[MixLayer<'_>]) -> Result<AudioBuffer> {
    mix(layers).map(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_scales_to_unit_peak() {
        let buf = normalize(AudioBuffer::from_samples(vec![0.25, -0.5, 0.1]));
        assert_eq!(buf.peak(), 1.0);
        assert_relative_eq!(buf.samples()[0], 0.5);
        assert_relative_eq!(buf.samples()[1], -1.0);
        assert_relative_eq!(buf.samples()[2], 0.2);
    }

    #[test]
    fn test_normalize_silence_stays_silent() {
        let buf = normalize(AudioBuffer::silence(1000));
        assert!(buf.is_silent());
        assert!(buf.is_finite());
    }

    #[test]
    fn test_normalize_boosts_quiet_signal() {
        let buf = normalize(AudioBuffer::from_samples(vec![1e-6, -2e-6]));
        assert_eq!(buf.peak(), 1.0);
    }

    #[test]
    fn test_mix_weights_layers() {
        let a = AudioBuffer::from_samples(vec![1.0, 0.0, -1.0]);
        let b = AudioBuffer::from_samples(vec![0.0, 1.0, 1.0]);
        let mixed = mix(&[MixLayer::new(&a, 0.7), MixLayer::new(&b, 0.3)]).unwrap();
        assert_relative_eq!(mixed.samples()[0], 0.7);
        assert_relative_eq!(mixed.samples()[1], 0.3);
        assert_relative_eq!(mixed.samples()[2], -0.4);
    }

    #[test]
    fn test_mix_cancelling_layers_is_silent_not_nan() {
        let a = AudioBuffer::from_samples(vec![0.5, -0.25]);
        let b = AudioBuffer::from_samples(vec![-0.5, 0.25]);
        let mixed = mix_normalized(&[MixLayer::new(&a, 1.0), MixLayer::new(&b, 1.0)]).unwrap();
        assert!(mixed.is_silent());
        assert!(mixed.is_finite());
    }

    #[test]
    fn test_mix_rejects_length_mismatch() {
        let a = AudioBuffer::silence(10);
        let b = AudioBuffer::silence(12);
        let err = mix(&[MixLayer::new(&a, 0.5), MixLayer::new(&b, 0.5)]).unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_mix_rejects_empty_layer_list() {
        assert!(mix(&[]).is_err());
    }
}
