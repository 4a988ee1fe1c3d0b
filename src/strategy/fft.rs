//! Forward FFT strategy backed by rustfft.

use super::{check_views, finished_error, sample_to_f32, TransformStrategy};
use crate::buffers::{FloatBuffer, NativeBuffer, NativeBufferFactory, ShortBuffer};
use crate::{TransformConfig, TransformResult};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned, precomputed state. Dropped by `finish`.
struct FftPlan {
    fft: Arc<dyn Fft<f32>>,
    buffer: NativeBuffer<Complex<f32>>,
    scratch: NativeBuffer<Complex<f32>>,
    window: FloatBuffer,
}

/// Complex FFT of length `L` over the real window, keeping bins `0..=L/2`.
///
/// The plan, the work buffer, the FFT scratch and the window coefficients are
/// all built in [`initialize`](TransformStrategy::initialize) through
/// [`NativeBufferFactory`], so a transform only touches memory it already owns.
pub struct FftStrategy {
    config: TransformConfig,
    plan: Option<FftPlan>,
}

impl TransformStrategy for FftStrategy {
    fn initialize(config: &TransformConfig) -> TransformResult<Self> {
        config.validate()?;
        let length = config.window_length();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(length);
        let buffer = NativeBufferFactory::allocate::<Complex<f32>>(length)?;
        let scratch = NativeBufferFactory::allocate::<Complex<f32>>(fft.get_inplace_scratch_len())?;
        let window = config.window_type().coefficients(length)?;

        tracing::debug!(window_length = length, "planned forward FFT");
        Ok(Self {
            config: *config,
            plan: Some(FftPlan {
                fft,
                buffer,
                scratch,
                window,
            }),
        })
    }

    fn transform<'s>(
        &mut self,
        window: &mut ShortBuffer,
        spectrum: &'s mut FloatBuffer,
    ) -> TransformResult<&'s mut FloatBuffer> {
        let config = self.config;
        let plan = self.plan.as_mut().ok_or_else(finished_error)?;
        check_views(&config, window, spectrum)?;

        let samples = window.take(config.short_capacity())?;
        let buffer = plan.buffer.as_mut_slice();
        for ((slot, &sample), &coefficient) in buffer.iter_mut().zip(samples).zip(plan.window.as_slice()) {
            *slot = Complex::new(sample_to_f32(sample) * coefficient, 0.0);
        }

        plan.fft.process_with_scratch(buffer, plan.scratch.as_mut_slice());

        let bins = spectrum.next_mut(config.spectrum_capacity())?;
        let scaling = config.scaling();
        for (bin, value) in bins.iter_mut().zip(plan.buffer.as_slice()) {
            *bin = scaling.apply(value.norm_sqr(), config.window_length());
        }
        Ok(spectrum)
    }

    fn finish(&mut self) {
        if self.plan.take().is_some() {
            tracing::debug!(window_length = self.config.window_length(), "finished FFT strategy");
        }
    }

    fn is_finished(&self) -> bool {
        self.plan.is_none()
    }

    fn name(&self) -> &'static str {
        "fft"
    }
}
