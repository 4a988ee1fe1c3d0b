//! Window functions applied to each analysis window before the transform.

use crate::buffers::{FloatBuffer, NativeBufferFactory};
use crate::TransformResult;
use std::f64::consts::PI;

/// Window function types for spectral analysis.
///
/// Different window functions provide different trade-offs between frequency
/// resolution and spectral leakage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowType {
    /// Rectangular window (no windowing) - best frequency resolution but high leakage.
    #[default]
    Rectangular,
    /// Hanning window - good general-purpose window with moderate leakage.
    Hanning,
    /// Hamming window - similar to Hanning but slightly different coefficients.
    Hamming,
    /// Blackman window - low leakage but wider main lobe.
    Blackman,
}

impl WindowType {
    /// Allocate a buffer of `size` window coefficients.
    ///
    /// Uses the symmetric form (denominator `size - 1`). A window of length 0
    /// or 1 is all ones.
    ///
    /// # Errors
    /// [`TransformError::Allocation`](crate::TransformError::Allocation) if the
    /// buffer cannot be allocated.
    pub fn coefficients(self, size: usize) -> TransformResult<FloatBuffer> {
        let mut window = NativeBufferFactory::allocate_floats(size)?;
        self.fill(window.as_mut_slice());
        Ok(window)
    }

    /// Overwrite `out` with `out.len()` window coefficients.
    pub fn fill(self, out: &mut [f32]) {
        let size = out.len();
        for (n, slot) in out.iter_mut().enumerate() {
            *slot = self.coefficient(n, size);
        }
    }

    /// Coefficient `n` of a window of `size` samples.
    pub fn coefficient(self, n: usize, size: usize) -> f32 {
        if size < 2 {
            return 1.0;
        }
        let n_max = (size - 1) as f64;
        let n = n as f64;
        let w = match self {
            Self::Rectangular => 1.0,
            Self::Hanning => 0.5 * (1.0 - (2.0 * PI * n / n_max).cos()),
            Self::Hamming => 0.54 - 0.46 * (2.0 * PI * n / n_max).cos(),
            Self::Blackman => {
                0.42 - 0.5 * (2.0 * PI * n / n_max).cos() + 0.08 * (4.0 * PI * n / n_max).cos()
            }
        };
        w as f32
    }
}
