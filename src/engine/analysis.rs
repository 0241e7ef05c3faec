//! Audio measurement utilities
//!
//! Objective measurements used by `inspect` and by tests that check the
//! character of generated audio without listening to it.
//!
//! # Measurements
//! - Peak and RMS level
//! - Averaged magnitude spectrum (Hann-windowed FFT)
//! - Spectral flatness (tonal vs. noise-like)
//! - Dominant frequency

use rustfft::{num_complex::Complex, FftPlanner};

/// Convert linear amplitude to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Peak absolute sample value
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Root mean square level (linear)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// One bin of an averaged power spectrum
#[derive(Debug, Clone, Copy)]
pub struct SpectralBin {
    pub frequency: f32,
    pub power: f32,
}

/// Power spectrum averaged over every full `fft_size` frame
///
/// Frames are Hann-windowed and non-overlapping. Returns the positive
/// frequency half, or an empty vector if the input is shorter than one frame.
pub fn analyze_spectrum(samples: &[f32], sample_rate: u32, fft_size: usize) -> Vec<SpectralBin> {
    if fft_size == 0 || samples.len() < fft_size {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);

    let window: Vec<f32> = (0..fft_size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos()))
        .collect();

    let half = fft_size / 2;
    let mut power = vec![0.0_f64; half];
    let mut frames = 0usize;
    let mut scratch = vec![Complex::new(0.0_f32, 0.0); fft_size];

    for frame in samples.chunks_exact(fft_size) {
        for ((slot, &s), &w) in scratch.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut scratch);
        for (acc, c) in power.iter_mut().zip(&scratch) {
            *acc += c.norm_sqr() as f64;
        }
        frames += 1;
    }

    let bin_hz = sample_rate as f32 / fft_size as f32;
    power
        .iter()
        .enumerate()
        .map(|(i, &p)| SpectralBin {
            frequency: i as f32 * bin_hz,
            power: (p / frames as f64) as f32,
        })
        .collect()
}

/// Geometric over arithmetic mean of bin power, excluding DC
///
/// Near 1 for white noise, near 0 for a pure tone.
pub fn spectral_flatness(spectrum: &[SpectralBin]) -> f32 {
    let bins: Vec<f64> = spectrum
        .iter()
        .skip(1)
        .map(|b| (b.power as f64).max(1e-20))
        .collect();
    if bins.is_empty() {
        return 0.0;
    }
    let log_mean = bins.iter().map(|p| p.ln()).sum::<f64>() / bins.len() as f64;
    let mean = bins.iter().sum::<f64>() / bins.len() as f64;
    (log_mean.exp() / mean) as f32
}

/// Frequency of the strongest bin above `min_hz`
pub fn dominant_frequency(spectrum: &[SpectralBin], min_hz: f32) -> Option<f32> {
    spectrum
        .iter()
        .filter(|b| b.frequency >= min_hz)
        .max_by(|a, b| a.power.total_cmp(&b.power))
        .map(|b| b.frequency)
}

/// Strongest bin power relative to the median bin power, above `min_hz`
///
/// Broadband noise stays near 1–3; a tone stands out by orders of magnitude.
pub fn peak_to_median_ratio(spectrum: &[SpectralBin], min_hz: f32) -> f32 {
    let mut powers: Vec<f32> = spectrum
        .iter()
        .filter(|b| b.frequency >= min_hz)
        .map(|b| b.power)
        .collect();
    if powers.is_empty() {
        return 0.0;
    }
    powers.sort_by(|a, b| a.total_cmp(b));
    let median = powers[powers.len() / 2];
    let max = powers[powers.len() - 1];
    if median > 0.0 {
        max / median
    } else {
        f32::INFINITY
    }
}

/// Summary printed by `inspect`
#[derive(Debug, Clone)]
pub struct AudioAnalysis {
    pub peak_db: f32,
    pub rms_db: f32,
    pub spectral_flatness: f32,
    pub dominant_frequency: Option<f32>,
}

/// Run every measurement with a 4096-point FFT
pub fn analyze(samples: &[f32], sample_rate: u32) -> AudioAnalysis {
    let spectrum = analyze_spectrum(samples, sample_rate, 4096);
    AudioAnalysis {
        peak_db: linear_to_db(peak(samples)),
        rms_db: linear_to_db(rms(samples)),
        spectral_flatness: spectral_flatness(&spectrum),
        dominant_frequency: dominant_frequency(&spectrum, 20.0),
    }
}
