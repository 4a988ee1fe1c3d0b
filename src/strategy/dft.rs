//! Direct DFT strategy.

use super::{check_views, finished_error, sample_to_f32, TransformStrategy};
use crate::buffers::{FloatBuffer, NativeBuffer, NativeBufferFactory, ShortBuffer};
use crate::{TransformConfig, TransformResult};
use std::f64::consts::PI;

struct DftTables {
    cos: NativeBuffer<f64>,
    sin: NativeBuffer<f64>,
    window: NativeBuffer<f64>,
    input: NativeBuffer<f64>,
}

/// Evaluates every bin directly from the definition, O(L^2) per window.
///
/// Twiddle factors for all `L` phases are tabulated at initialisation. The
/// phase `k * n mod L` is advanced by `k` per sample, so it never leaves
/// `0..L`. Slow, but independent of any FFT library, which makes it the
/// reference the other strategies are checked against.
pub struct DftStrategy {
    config: TransformConfig,
    tables: Option<DftTables>,
}

impl TransformStrategy for DftStrategy {
    fn initialize(config: &TransformConfig) -> TransformResult<Self> {
        config.validate()?;
        let length = config.window_length();
        let step = 2.0 * PI / length as f64;

        let mut cos = NativeBufferFactory::allocate::<f64>(length)?;
        let mut sin = NativeBufferFactory::allocate::<f64>(length)?;
        let mut window = NativeBufferFactory::allocate::<f64>(length)?;
        let window_type = config.window_type();
        for (n, ((c, s), w)) in cos
            .as_mut_slice()
            .iter_mut()
            .zip(sin.as_mut_slice())
            .zip(window.as_mut_slice())
            .enumerate()
        {
            *c = (step * n as f64).cos();
            *s = (step * n as f64).sin();
            *w = f64::from(window_type.coefficient(n, length));
        }

        let tables = DftTables {
            cos,
            sin,
            window,
            input: NativeBufferFactory::allocate::<f64>(length)?,
        };
        tracing::debug!(window_length = length, "tabulated DFT twiddles");
        Ok(Self {
            config: *config,
            tables: Some(tables),
        })
    }

    fn transform<'s>(
        &mut self,
        window: &mut ShortBuffer,
        spectrum: &'s mut FloatBuffer,
    ) -> TransformResult<&'s mut FloatBuffer> {
        let config = self.config;
        let tables = self.tables.as_mut().ok_or_else(finished_error)?;
        check_views(&config, window, spectrum)?;

        let length = config.window_length();
        let samples = window.take(config.short_capacity())?;
        let input = tables.input.as_mut_slice();
        for ((slot, &sample), &coefficient) in input.iter_mut().zip(samples).zip(tables.window.as_slice()) {
            *slot = f64::from(sample_to_f32(sample)) * coefficient;
        }

        let scaling = config.scaling();
        let (cos, sin) = (tables.cos.as_slice(), tables.sin.as_slice());
        let bins = spectrum.next_mut(config.spectrum_capacity())?;
        for (k, bin) in bins.iter_mut().enumerate() {
            let (mut re, mut im) = (0.0, 0.0);
            let mut phase = 0;
            for &x in input.iter() {
                re += x * cos[phase];
                im -= x * sin[phase];
                phase = (phase + k) % length;
            }
            *bin = scaling.apply((re * re + im * im) as f32, length);
        }
        Ok(spectrum)
    }

    fn finish(&mut self) {
        if self.tables.take().is_some() {
            tracing::debug!(window_length = self.config.window_length(), "finished DFT strategy");
        }
    }

    fn is_finished(&self) -> bool {
        self.tables.is_none()
    }

    fn name(&self) -> &'static str {
        "dft"
    }
}
