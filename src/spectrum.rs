//! Caller-owned spectra and helpers for the visualisation layer.

use ndarray::Array2;
use std::ops::Deref;

/// The spectrum of one window, copied out of the shared scratch.
///
/// Owns its bins, so it stays valid however many windows the pipeline runs
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<f32>,
    window_index: usize,
    written: usize,
}

impl Spectrum {
    /// Build a spectrum from copied bins.
    ///
    /// `written` is the scratch cursor at copy time and may be smaller than
    /// `bins.len()` only for strategies that under-fill the scratch.
    pub fn new(bins: Vec<f32>, window_index: usize, written: usize) -> Self {
        Self {
            bins,
            window_index,
            written,
        }
    }

    /// All bins, DC first and Nyquist last.
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Index of the window this spectrum was computed from.
    pub const fn window_index(&self) -> usize {
        self.window_index
    }

    /// Number of bins the strategy wrote.
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Index and value of the largest bin, or `None` for an empty spectrum.
    pub fn peak_bin(&self) -> Option<(usize, f32)> {
        self.bins
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Consume the spectrum, returning its bins.
    pub fn into_vec(self) -> Vec<f32> {
        self.bins
    }
}

impl Deref for Spectrum {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.bins
    }
}

impl AsRef<[f32]> for Spectrum {
    fn as_ref(&self) -> &[f32] {
        &self.bins
    }
}

/// Centre frequency in Hz of bin `bin` for a window of `window_length` samples.
pub fn bin_frequency(bin: usize, sample_rate: u32, window_length: usize) -> f64 {
    bin as f64 * f64::from(sample_rate) / window_length as f64
}

/// Stack spectra into a `(bins, windows)` matrix, one column per window.
///
/// Spectra of different lengths are truncated to the shortest one. Returns an
/// empty `(0, 0)` matrix for no spectra.
pub fn spectrogram(spectra: &[Spectrum]) -> Array2<f32> {
    let bins = spectra.iter().map(|s| s.len()).min().unwrap_or(0);
    Array2::from_shape_fn((bins, spectra.len()), |(bin, window)| spectra[window][bin])
}
