//! Sample-at-a-time signal sources
//!
//! Every streamable generator implements [`SampleSource`]. Filling a buffer
//! in any sequence of chunks yields exactly the samples of one unchunked
//! fill, because all carried state lives inside the source.

/// A stateful generator producing one sample per call
pub trait SampleSource {
    /// Produce the next sample
    fn next_sample(&mut self) -> f32;

    /// Fill `out` with the next `out.len()` samples
    fn fill(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Render `num_samples` into a fresh vector
    fn render(&mut self, num_samples: usize) -> Vec<f32> {
        let mut out = vec![0.0; num_samples];
        self.fill(&mut out);
        out
    }
}

/// Peak absolute amplitude over the next `num_samples`, scanned in chunks
///
/// Advances the source; callers scan a clone when the samples are needed
/// again afterwards.
pub fn scan_peak<S: SampleSource>(source: &mut S, num_samples: usize, chunk_samples: usize) -> f32 {
    let chunk_samples = chunk_samples.max(1);
    let mut scratch = vec![0.0_f32; chunk_samples.min(num_samples)];
    let mut remaining = num_samples;
    let mut peak = 0.0_f32;

    while remaining > 0 {
        let n = remaining.min(chunk_samples);
        let chunk = &mut scratch[..n];
        source.fill(chunk);
        peak = chunk.iter().map(|s| s.abs()).fold(peak, f32::max);
        remaining -= n;
    }

    peak
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Ramp(f32);

    impl SampleSource for Ramp {
        fn next_sample(&mut self) -> f32 {
            self.0 += 1.0;
            -self.0
        }
    }

    #[test]
    fn test_render_length() {
        assert_eq!(Ramp(0.0).render(17).len(), 17);
    }

    #[test]
    fn test_scan_peak_across_chunks() {
        let mut ramp = Ramp(0.0);
        assert_eq!(scan_peak(&mut ramp, 10, 3), 10.0);
    }

    #[test]
    fn test_scan_peak_empty() {
        assert_eq!(scan_peak(&mut Ramp(0.0), 0, 4), 0.0);
    }
}
