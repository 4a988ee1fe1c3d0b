//! The owning pipeline: configuration, scratch buffers and strategy together.

use crate::buffer_set::TransformBufferSet;
use crate::buffers::FloatBuffer;
use crate::segmenter::WindowSegmenter;
use crate::spectrum::Spectrum;
use crate::strategy::TransformStrategy;
use crate::{TransformConfig, TransformError, TransformResult};

/// A windowed spectral transform pipeline built around strategy `S`.
///
/// Construction validates the configuration, initialises the strategy and
/// allocates the scratch buffers once. Every call to
/// [`make_spectrum`](Self::make_spectrum) reuses them.
///
/// Teardown happens through [`finish`](Self::finish) or, failing that, when the
/// analyzer is dropped. Any operation after `finish` returns
/// [`TransformError::Misuse`].
///
/// The scratch buffers are mutable state of this instance. Calls take
/// `&mut self`, so sharing an analyzer across threads requires external
/// synchronisation; independent analyzers share nothing.
///
/// # Example
/// ```
/// use audio_spectrum::{FftStrategy, SpectrumAnalyzer};
///
/// let mut analyzer = SpectrumAnalyzer::<FftStrategy>::with_window_length(1024)?;
/// let spectra = analyzer.make_spectrum(&vec![0i16; 2048])?;
/// assert_eq!(spectra.len(), 2);
/// assert_eq!(spectra[0].len(), 513);
/// analyzer.finish();
/// # Ok::<(), audio_spectrum::TransformError>(())
/// ```
pub struct SpectrumAnalyzer<S: TransformStrategy> {
    config: TransformConfig,
    segmenter: WindowSegmenter,
    buffers: TransformBufferSet,
    strategy: S,
}

impl<S: TransformStrategy> SpectrumAnalyzer<S> {
    /// Build an analyzer for `config`.
    ///
    /// # Errors
    /// [`TransformError::Parameter`] for an invalid configuration,
    /// [`TransformError::Allocation`] if the scratch buffers cannot be
    /// allocated, or any error from [`TransformStrategy::initialize`].
    pub fn new(config: TransformConfig) -> TransformResult<Self> {
        config.validate()?;
        let strategy = S::initialize(&config)?;
        let buffers = TransformBufferSet::initialize(&config)?;
        tracing::debug!(
            strategy = strategy.name(),
            window_length = config.window_length(),
            "created spectrum analyzer"
        );
        Ok(Self {
            config,
            segmenter: WindowSegmenter::new(config.short_capacity()),
            buffers,
            strategy,
        })
    }

    /// Build an analyzer with the default window and scaling for
    /// `window_length` samples per window.
    pub fn with_window_length(window_length: usize) -> TransformResult<Self> {
        Self::new(TransformConfig::new(window_length)?)
    }

    /// Transform every window of `samples`, one owned [`Spectrum`] per window.
    ///
    /// See [`WindowSegmenter`] for how `samples` is split.
    pub fn make_spectrum(&mut self, samples: &[i16]) -> TransformResult<Vec<Spectrum>> {
        self.ensure_active("make_spectrum")?;
        self.segmenter
            .run(&mut self.buffers, &mut self.strategy, samples)
    }

    /// Transform a single window and return the live spectrum scratch.
    ///
    /// The window must hold exactly [`window_length`](Self::window_length)
    /// samples. The returned buffer is overwritten by the next transform.
    pub fn transform_window(&mut self, window: &[i16]) -> TransformResult<&FloatBuffer> {
        self.ensure_active("transform_window")?;
        if window.len() != self.config.short_capacity() {
            return Err(TransformError::misuse(
                "transform_window",
                format!(
                    "window has {} samples, {} required",
                    window.len(),
                    self.config.short_capacity()
                ),
            ));
        }
        self.segmenter
            .transform_window(&mut self.buffers, &mut self.strategy, window)?;
        self.buffers.spectrum()
    }

    /// The live spectrum scratch, aliased rather than copied.
    pub fn spectrum(&self) -> TransformResult<&FloatBuffer> {
        self.ensure_active("spectrum")?;
        self.buffers.spectrum()
    }

    /// Samples per window.
    pub const fn window_length(&self) -> usize {
        self.config.window_length()
    }

    /// Change the window length, rebuilding the strategy and all buffers.
    ///
    /// Keeps the window type and scaling. The new strategy and buffers are
    /// built before the old ones are released, so on error the analyzer is left
    /// as it was.
    pub fn set_window_length(&mut self, window_length: usize) -> TransformResult<()> {
        let config = TransformConfig::new(window_length)?
            .with_window_type(self.config.window_type())
            .with_scaling(self.config.scaling());
        self.reconfigure(config)
    }

    /// Replace the configuration, rebuilding the strategy and all buffers.
    pub fn reconfigure(&mut self, config: TransformConfig) -> TransformResult<()> {
        self.ensure_active("reconfigure")?;
        config.validate()?;
        let strategy = S::initialize(&config)?;
        let buffers = TransformBufferSet::initialize(&config)?;

        self.teardown();
        tracing::debug!(
            from = self.config.window_length(),
            to = config.window_length(),
            "reconfigured spectrum analyzer"
        );
        self.config = config;
        self.segmenter = WindowSegmenter::new(config.short_capacity());
        self.strategy = strategy;
        self.buffers = buffers;
        Ok(())
    }

    /// Current configuration.
    pub const fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// The strategy in use.
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The scratch buffers.
    pub const fn buffers(&self) -> &TransformBufferSet {
        &self.buffers
    }

    /// Finish the strategy and release every buffer.
    ///
    /// Calling it again does nothing.
    pub fn finish(&mut self) {
        if self.is_finished() {
            tracing::debug!("spectrum analyzer already finished");
            return;
        }
        self.teardown();
    }

    /// Whether [`finish`](Self::finish) has run.
    pub fn is_finished(&self) -> bool {
        self.buffers.is_released()
    }

    fn teardown(&mut self) {
        self.strategy.finish();
        self.buffers.release_all_buffers();
    }

    fn ensure_active(&self, operation: &'static str) -> TransformResult<()> {
        if self.is_finished() {
            return Err(TransformError::misuse(operation, "analyzer has been finished"));
        }
        Ok(())
    }
}

impl<S: TransformStrategy> Drop for SpectrumAnalyzer<S> {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DftStrategy, FftStrategy, SpectrumScaling, WindowType};

    #[test]
    fn test_make_spectrum_shapes() {
        let mut analyzer = SpectrumAnalyzer::<FftStrategy>::with_window_length(512).unwrap();
        let spectra = analyzer.make_spectrum(&vec![0; 500]).unwrap();
        assert_eq!(spectra.len(), 1);
        assert_eq!(spectra[0].len(), 257);

        let spectra = analyzer.make_spectrum(&vec![0; 512 * 3 + 100]).unwrap();
        assert_eq!(spectra.len(), 3);
        analyzer.finish();
    }

    #[test]
    fn test_finish_is_idempotent_and_blocks_use() {
        let mut analyzer = SpectrumAnalyzer::<DftStrategy>::with_window_length(16).unwrap();
        analyzer.finish();
        analyzer.finish();
        assert!(analyzer.is_finished());
        assert!(analyzer.strategy().is_finished());

        assert!(matches!(
            analyzer.make_spectrum(&[0; 16]),
            Err(TransformError::Misuse { operation: "make_spectrum", .. })
        ));
        assert!(analyzer.spectrum().is_err());
        assert!(analyzer.transform_window(&[0; 16]).is_err());
        assert!(analyzer.set_window_length(32).is_err());
    }

    #[test]
    fn test_spectrum_aliases_scratch() {
        let mut analyzer = SpectrumAnalyzer::<FftStrategy>::with_window_length(64).unwrap();
        let spectra = analyzer.make_spectrum(&[1000; 64]).unwrap();
        let live = analyzer.spectrum().unwrap();
        assert_eq!(live.as_slice(), spectra[0].bins());

        analyzer.make_spectrum(&[0; 64]).unwrap();
        assert!(analyzer.spectrum().unwrap().as_slice().iter().all(|&v| v == 0.0));
        // The copy survives the overwrite
        assert!(spectra[0][0] > 0.0);
    }

    #[test]
    fn test_transform_window_requires_full_window() {
        let mut analyzer = SpectrumAnalyzer::<FftStrategy>::with_window_length(32).unwrap();
        assert!(analyzer.transform_window(&[0; 31]).is_err());
        assert!(analyzer.transform_window(&[0; 33]).is_err());

        let spectrum = analyzer.transform_window(&[0; 32]).unwrap();
        assert_eq!(spectrum.capacity(), 17);
        assert_eq!(spectrum.position(), 17);
    }

    #[test]
    fn test_set_window_length_rebuilds_buffers() {
        let config = TransformConfig::new(256)
            .unwrap()
            .with_window_type(WindowType::Hamming)
            .with_scaling(SpectrumScaling::Power);
        let mut analyzer = SpectrumAnalyzer::<FftStrategy>::new(config).unwrap();

        analyzer.set_window_length(1024).unwrap();
        assert_eq!(analyzer.window_length(), 1024);
        assert_eq!(analyzer.config().window_type(), WindowType::Hamming);
        assert_eq!(analyzer.config().scaling(), SpectrumScaling::Power);
        assert_eq!(analyzer.buffers().raw_scratch().unwrap().capacity(), 1024);
        assert_eq!(analyzer.spectrum().unwrap().capacity(), 513);

        let spectra = analyzer.make_spectrum(&vec![0; 2048]).unwrap();
        assert_eq!(spectra.len(), 2);
        assert_eq!(spectra[0].len(), 513);
    }

    #[test]
    fn test_failed_reconfigure_keeps_analyzer() {
        let mut analyzer = SpectrumAnalyzer::<FftStrategy>::with_window_length(128).unwrap();
        assert!(analyzer.set_window_length(100).is_err());
        assert_eq!(analyzer.window_length(), 128);
        assert_eq!(analyzer.make_spectrum(&[0; 128]).unwrap()[0].len(), 65);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            SpectrumAnalyzer::<FftStrategy>::with_window_length(3),
            Err(TransformError::Parameter(_))
        ));
    }
}
