// Spectral module - Band-limited RMS energy via a zero-padded FFT
//
// The segment is zero-padded to the next power of two and transformed without
// windowing. Only the lower half of the bins is examined (Hermitian symmetry
// of a real input). Each call computes its own spectrum; only FFT plans are
// cached between calls.

use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::{Arc, Mutex};

use super::metrics::FrequencyBand;

/// FFT size used for a segment of `len` samples (next power of two, min 1).
pub fn padded_fft_size(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

/// Indices of the bins below Nyquist whose frequency lies in `[min_freq, max_freq)`.
fn band_bins(
    fft_size: usize,
    rate: f64,
    min_freq: f64,
    max_freq: f64,
) -> impl Iterator<Item = usize> {
    let freq_resolution = rate / fft_size as f64;
    (0..fft_size / 2).filter(move |&i| {
        let freq = i as f64 * freq_resolution;
        min_freq <= freq && freq < max_freq
    })
}

/// Number of FFT bins a segment of `len` samples puts inside `band`.
///
/// Zero means the band reads 0 for such a segment: either it lies above
/// Nyquist or the bin spacing `rate / padded_fft_size(len)` skips over it.
pub fn band_bin_count(len: usize, rate: f64, band: FrequencyBand) -> usize {
    if len == 0 || !(rate > 0.0) {
        return 0;
    }
    band_bins(
        padded_fft_size(len),
        rate,
        band.low_hz as f64,
        band.high_hz as f64,
    )
    .count()
}

/// Computes RMS spectral energy of a real signal within a frequency band.
///
/// The FFT plan cache is the only state kept between calls. Cloning shares
/// it; the parallel metric path gives every worker its own analyzer instead.
#[derive(Clone)]
pub struct SpectralBandAnalyzer {
    fft_planner: Arc<Mutex<FftPlanner<f64>>>,
}

impl SpectralBandAnalyzer {
    pub fn new() -> Self {
        Self {
            fft_planner: Arc::new(Mutex::new(FftPlanner::new())),
        }
    }

    /// Compute the complex spectrum of `signal` zero-padded to a power of two
    fn spectrum(&self, signal: &[f64]) -> Vec<Complex<f64>> {
        let fft_size = padded_fft_size(signal.len());

        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .map(|&sample| Complex::new(sample, 0.0))
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));

        // Plan under the lock, transform outside it
        let fft = {
            let mut planner = self
                .fft_planner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            planner.plan_fft_forward(fft_size)
        };
        fft.process(&mut buffer);

        buffer
    }

    /// RMS of squared FFT magnitudes over bins with `min_freq <= f < max_freq`.
    ///
    /// # Arguments
    /// * `signal` - Real-valued segment (one scalar per sample)
    /// * `rate` - Sample rate in Hz
    /// * `min_freq` / `max_freq` - Band edges in Hz
    ///
    /// # Returns
    /// `sqrt(sum / count)` over the selected bins, or 0 when no bin below
    /// Nyquist falls inside the band (band unmeasurable at this rate).
    pub fn band_rms(&self, signal: &[f64], rate: f64, min_freq: f64, max_freq: f64) -> f64 {
        if signal.is_empty() || rate <= 0.0 {
            return 0.0;
        }

        let spectrum = self.spectrum(signal);

        let (sum, count) = band_bins(spectrum.len(), rate, min_freq, max_freq)
            .fold((0.0_f64, 0usize), |(sum, count), i| {
                (sum + spectrum[i].norm_sqr(), count + 1)
            });

        if count > 0 {
            (sum / count as f64).sqrt()
        } else {
            0.0
        }
    }

    /// Convenience wrapper taking one of the fixed analysis bands.
    pub fn band(&self, signal: &[f64], rate: f64, band: FrequencyBand) -> f64 {
        self.band_rms(signal, rate, band.low_hz as f64, band.high_hz as f64)
    }
}

impl Default for SpectralBandAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
