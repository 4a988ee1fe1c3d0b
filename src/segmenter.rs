//! Splitting a sample stream into analysis windows and driving the strategy
//! over each of them.

use crate::buffer_set::TransformBufferSet;
use crate::spectrum::Spectrum;
use crate::strategy::TransformStrategy;
use crate::{TransformError, TransformResult};

/// Partitions input samples into windows of `short_capacity` samples.
///
/// Segmentation rules:
///
/// - an input of at most one window (including an empty one) is treated as
///   exactly one window, even when it is shorter than the window length;
/// - a longer input yields `n / w` windows, and trailing samples that do not
///   fill a whole window are dropped.
///
/// A short window is copied into the start of the scratch and the rest is
/// zero-filled, so an empty input transforms as silence and no samples from an
/// earlier window reach a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSegmenter {
    short_capacity: usize,
}

impl WindowSegmenter {
    /// Create a segmenter for windows of `short_capacity` samples.
    pub const fn new(short_capacity: usize) -> Self {
        Self { short_capacity }
    }

    /// Samples per window.
    pub const fn short_capacity(&self) -> usize {
        self.short_capacity
    }

    /// Number of windows produced for an input of `len` samples.
    pub const fn cycle_count(&self, len: usize) -> usize {
        if len <= self.short_capacity {
            1
        } else {
            len / self.short_capacity
        }
    }

    /// Number of trailing samples that no window covers.
    pub const fn dropped_samples(&self, len: usize) -> usize {
        if len <= self.short_capacity {
            0
        } else {
            len % self.short_capacity
        }
    }

    /// The window slices of `samples`, in order.
    pub fn windows<'a>(&self, samples: &'a [i16]) -> impl ExactSizeIterator<Item = &'a [i16]> + 'a {
        let w = self.short_capacity;
        (0..self.cycle_count(samples.len()))
            .map(move |i| &samples[i * w..((i + 1) * w).min(samples.len())])
    }

    /// Transform every window of `samples` and return one owned spectrum per
    /// window.
    ///
    /// Each window is copied into the short view of `buffers`, the spectrum
    /// scratch cursor is cleared, `strategy` runs, and the scratch is copied into
    /// a new [`Spectrum`] before the next window overwrites it.
    ///
    /// # Errors
    /// [`TransformError::Misuse`] if `buffers` were released, if the
    /// segmenter and buffers disagree on the window length, or if the strategy
    /// does not consume one full window and fill every bin.
    pub fn run<S: TransformStrategy>(
        &self,
        buffers: &mut TransformBufferSet,
        strategy: &mut S,
        samples: &[i16],
    ) -> TransformResult<Vec<Spectrum>> {
        let cycles = self.cycle_count(samples.len());
        let dropped = self.dropped_samples(samples.len());
        if dropped > 0 {
            tracing::debug!(dropped, "trailing samples do not fill a window");
        }

        let mut result = Vec::with_capacity(cycles);
        for (index, window) in self.windows(samples).enumerate() {
            let written = self.transform_window(buffers, strategy, window)?;
            tracing::trace!(window = index, samples = window.len(), "transformed window");
            result.push(Spectrum::new(buffers.spectrum()?.to_vec(), index, written));
        }
        Ok(result)
    }

    /// Run `strategy` over one window held in the scratch of `buffers`.
    ///
    /// `window` may be shorter than the window length (see the type-level docs)
    /// but not longer. On success the spectrum scratch holds the new bins and
    /// the number of bins written is returned.
    pub fn transform_window<S: TransformStrategy>(
        &self,
        buffers: &mut TransformBufferSet,
        strategy: &mut S,
        window: &[i16],
    ) -> TransformResult<usize> {
        if buffers.config().short_capacity() != self.short_capacity {
            return Err(TransformError::misuse(
                "transform_window",
                format!(
                    "segmenter window of {} samples does not match buffers sized for {}",
                    self.short_capacity,
                    buffers.config().short_capacity()
                ),
            ));
        }
        let (short_view, spectrum) = buffers.scratch_mut()?;

        short_view.clear();
        short_view.put_slice(window)?;
        short_view.next_mut(self.short_capacity - window.len())?.fill(0);
        short_view.rewind();
        spectrum.clear();

        strategy.transform(short_view, spectrum)?;

        let consumed = short_view.position();
        short_view.clear();
        if consumed != self.short_capacity {
            return Err(TransformError::misuse(
                "transform",
                format!(
                    "{} consumed {} of {} samples",
                    strategy.name(),
                    consumed,
                    self.short_capacity
                ),
            ));
        }
        if spectrum.position() != spectrum.capacity() {
            return Err(TransformError::misuse(
                "transform",
                format!(
                    "{} wrote {} of {} bins",
                    strategy.name(),
                    spectrum.position(),
                    spectrum.capacity()
                ),
            ));
        }
        Ok(spectrum.position())
    }
}
