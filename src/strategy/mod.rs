//! The pluggable numeric transform behind the pipeline.
//!
//! A [`TransformStrategy`] turns one window of `L` signed 16-bit samples into
//! `L / 2 + 1` float bins. Strategies are built through
//! [`TransformStrategy::initialize`], which precomputes whatever tables the
//! algorithm needs for the configured window length; the pipeline then calls
//! [`transform`](TransformStrategy::transform) once per window with views into
//! its shared scratch buffers.

mod dft;
mod fft;

pub use dft::DftStrategy;
pub use fft::FftStrategy;

use crate::buffers::{FloatBuffer, ShortBuffer};
use crate::{TransformConfig, TransformError, TransformResult};

/// Divisor mapping an `i16` sample into `[-1, 1)`.
pub const SAMPLE_SCALE: f32 = 32768.0;

/// Convert a 16-bit sample to a float in `[-1, 1)`.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    f32::from(sample) / SAMPLE_SCALE
}

/// One numeric transform from a window of samples to a spectrum.
///
/// Implementations must:
///
/// - consume exactly `config.short_capacity()` samples from `window`,
///   starting at its cursor;
/// - write exactly `config.spectrum_capacity()` floats into `spectrum`,
///   starting at its cursor;
/// - not allocate inside [`transform`](Self::transform);
/// - leave both cursors untouched when they return an error.
///
/// Instances are not meant to be shared between threads while in use.
pub trait TransformStrategy: Sized {
    /// Build the strategy and its precomputed tables for `config`.
    fn initialize(config: &TransformConfig) -> TransformResult<Self>;

    /// Transform one window, returning the buffer that was written.
    ///
    /// # Errors
    /// [`TransformError::Misuse`] if the strategy was finished or if either view
    /// has fewer elements remaining than one window requires.
    fn transform<'s>(
        &mut self,
        window: &mut ShortBuffer,
        spectrum: &'s mut FloatBuffer,
    ) -> TransformResult<&'s mut FloatBuffer>;

    /// Release the precomputed tables. The strategy is unusable afterwards.
    fn finish(&mut self);

    /// Whether [`finish`](Self::finish) has been called.
    fn is_finished(&self) -> bool;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Check that both views can hold one window for `config`.
pub(crate) fn check_views(
    config: &TransformConfig,
    window: &ShortBuffer,
    spectrum: &FloatBuffer,
) -> TransformResult<()> {
    if window.remaining() < config.short_capacity() {
        return Err(TransformError::misuse(
            "transform",
            format!(
                "window view has {} samples remaining, {} required",
                window.remaining(),
                config.short_capacity()
            ),
        ));
    }
    if spectrum.remaining() < config.spectrum_capacity() {
        return Err(TransformError::misuse(
            "transform",
            format!(
                "spectrum view has {} bins remaining, {} required",
                spectrum.remaining(),
                config.spectrum_capacity()
            ),
        ));
    }
    Ok(())
}

pub(crate) fn finished_error() -> TransformError {
    TransformError::misuse("transform", "strategy has been finished")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::NativeBufferFactory;
    use crate::{SpectrumScaling, WindowType};
    use std::f64::consts::PI;

    fn sine_window(len: usize, bin: usize, amplitude: f64) -> Vec<i16> {
        (0..len)
            .map(|i| (amplitude * (2.0 * PI * bin as f64 * i as f64 / len as f64).sin()) as i16)
            .collect()
    }

    fn run<S: TransformStrategy>(config: &TransformConfig, samples: &[i16]) -> Vec<f32> {
        let mut strategy = S::initialize(config).unwrap();
        let mut window = NativeBufferFactory::from_slice(samples).unwrap();
        let mut spectrum = NativeBufferFactory::allocate_floats(config.spectrum_capacity()).unwrap();
        strategy.transform(&mut window, &mut spectrum).unwrap();
        assert_eq!(window.position(), config.short_capacity());
        assert_eq!(spectrum.position(), config.spectrum_capacity());
        spectrum.to_vec()
    }

    /// Runs every window through one strategy instance.
    fn run_each<S: TransformStrategy>(config: &TransformConfig, windows: &[&[i16]]) -> Vec<Vec<f32>> {
        let mut strategy = S::initialize(config).unwrap();
        let mut spectrum = NativeBufferFactory::allocate_floats(config.spectrum_capacity()).unwrap();
        windows
            .iter()
            .map(|samples| {
                let mut window = NativeBufferFactory::from_slice(samples).unwrap();
                spectrum.clear();
                strategy.transform(&mut window, &mut spectrum).unwrap();
                spectrum.to_vec()
            })
            .collect()
    }

    #[test]
    fn test_sample_to_f32_range() {
        assert_eq!(sample_to_f32(i16::MIN), -1.0);
        assert_eq!(sample_to_f32(0), 0.0);
        assert!(sample_to_f32(i16::MAX) < 1.0);
    }

    #[test]
    fn test_fft_and_dft_agree() {
        let config = TransformConfig::new(64)
            .unwrap()
            .with_window_type(WindowType::Hanning);
        let mut samples = sine_window(64, 5, 12000.0);
        for (i, s) in sine_window(64, 17, 3000.0).into_iter().enumerate() {
            samples[i] = samples[i].saturating_add(s);
        }

        let fft = run::<FftStrategy>(&config, &samples);
        let dft = run::<DftStrategy>(&config, &samples);
        assert_eq!(fft.len(), 33);
        for (k, (a, b)) in fft.iter().zip(&dft).enumerate() {
            assert!((a - b).abs() < 1e-4, "bin {k}: fft={a}, dft={b}");
        }
    }

    #[test]
    fn test_dft_matches_fft_near_nyquist() {
        let config = TransformConfig::new(1024).unwrap();
        let mut samples = sine_window(1024, 511, 9000.0);
        for (i, s) in sine_window(1024, 300, 9000.0).into_iter().enumerate() {
            samples[i] = samples[i].saturating_add(s);
        }

        let fft = run::<FftStrategy>(&config, &samples);
        let dft = run::<DftStrategy>(&config, &samples);
        for (k, (a, b)) in fft.iter().zip(&dft).enumerate() {
            assert!((a - b).abs() < 1e-4, "bin {k}: fft={a}, dft={b}");
        }
        assert!(dft[511] > 0.1);
        assert!(dft[300] > 0.1);
    }

    #[test]
    fn test_work_buffers_are_reused_across_windows() {
        let config = TransformConfig::new(128)
            .unwrap()
            .with_window_type(WindowType::Blackman);
        let tone = sine_window(128, 9, 10000.0);
        let noise: Vec<i16> = (0..128).map(|i| ((i * 7919) % 4001) as i16 - 2000).collect();

        let windows = [&tone[..], &noise[..], &tone[..]];
        let fft = run_each::<FftStrategy>(&config, &windows);
        let dft = run_each::<DftStrategy>(&config, &windows);
        assert_eq!(fft[0], fft[2]);
        assert_eq!(dft[0], dft[2]);
        assert_ne!(fft[0], fft[1]);
    }

    #[test]
    fn test_silence_yields_zero_bins() {
        for scaling in [SpectrumScaling::Raw, SpectrumScaling::Magnitude, SpectrumScaling::Power] {
            let config = TransformConfig::new(128).unwrap().with_scaling(scaling);
            let silence = vec![0i16; 128];
            assert!(run::<FftStrategy>(&config, &silence).iter().all(|&v| v.abs() < 1e-9));
            assert!(run::<DftStrategy>(&config, &silence).iter().all(|&v| v.abs() < 1e-9));
        }
    }

    #[test]
    fn test_pure_tone_peaks_at_its_bin() {
        let config = TransformConfig::new(256).unwrap();
        let samples = sine_window(256, 32, 16384.0);
        for spectrum in [
            run::<FftStrategy>(&config, &samples),
            run::<DftStrategy>(&config, &samples),
        ] {
            let peak = spectrum
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(k, _)| k);
            assert_eq!(peak, Some(32));
            // Amplitude 0.5 split between the positive and negative frequency
            assert!((spectrum[32] - 0.25).abs() < 1e-3);
        }
    }

    #[test]
    fn test_undersized_views_are_rejected() {
        let config = TransformConfig::new(32).unwrap();
        let mut strategy = FftStrategy::initialize(&config).unwrap();

        let mut short_window = NativeBufferFactory::allocate_shorts(16).unwrap();
        let mut spectrum = NativeBufferFactory::allocate_floats(17).unwrap();
        let err = strategy.transform(&mut short_window, &mut spectrum).unwrap_err();
        assert!(matches!(err, TransformError::Misuse { .. }));
        assert_eq!(short_window.position(), 0);

        let mut window = NativeBufferFactory::allocate_shorts(32).unwrap();
        let mut small_spectrum = NativeBufferFactory::allocate_floats(16).unwrap();
        assert!(strategy.transform(&mut window, &mut small_spectrum).is_err());
        assert_eq!(window.position(), 0);
        assert_eq!(small_spectrum.position(), 0);
    }

    #[test]
    fn test_transform_after_finish_is_rejected() {
        let config = TransformConfig::new(16).unwrap();
        let mut window = NativeBufferFactory::allocate_shorts(16).unwrap();
        let mut spectrum = NativeBufferFactory::allocate_floats(9).unwrap();

        let mut fft = FftStrategy::initialize(&config).unwrap();
        fft.finish();
        assert!(fft.is_finished());
        assert!(fft.transform(&mut window, &mut spectrum).is_err());

        let mut dft = DftStrategy::initialize(&config).unwrap();
        dft.finish();
        dft.finish();
        assert!(dft.transform(&mut window, &mut spectrum).is_err());
    }

    #[test]
    fn test_transform_returns_written_buffer() {
        let config = TransformConfig::new(16).unwrap();
        let mut strategy = DftStrategy::initialize(&config).unwrap();
        let mut window = NativeBufferFactory::allocate_shorts(16).unwrap();
        let mut spectrum = NativeBufferFactory::allocate_floats(9).unwrap();

        let written = strategy.transform(&mut window, &mut spectrum).unwrap();
        written.flip();
        assert_eq!(written.remaining(), 9);
    }
}
