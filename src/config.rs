//! Transform configuration and the buffer capacities derived from it.

use crate::error::ParameterError;
use crate::window::WindowType;

/// Smallest accepted window length, in samples.
pub const MIN_WINDOW_LENGTH: usize = 2;
/// Largest accepted window length, in samples.
pub const MAX_WINDOW_LENGTH: usize = 1 << 20;
/// Window length used by [`TransformConfig::default`].
pub const DEFAULT_WINDOW_LENGTH: usize = 1024;

/// Scale applied to each frequency bin written into the spectrum.
///
/// `X[k]` below is the unnormalised DFT of the windowed samples, with samples
/// mapped to `[-1, 1)` by dividing by 32768.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SpectrumScaling {
    /// `|X[k]|`
    Raw,
    /// `|X[k]| / L`
    #[default]
    Magnitude,
    /// `(|X[k]| / L)^2`
    Power,
}

impl SpectrumScaling {
    /// Map the squared magnitude of bin `k` to the stored value.
    #[inline]
    pub fn apply(self, norm_sqr: f32, window_length: usize) -> f32 {
        let l = window_length as f32;
        match self {
            Self::Raw => norm_sqr.sqrt(),
            Self::Magnitude => norm_sqr.sqrt() / l,
            Self::Power => norm_sqr / (l * l),
        }
    }
}

/// Immutable description of one transform pipeline.
///
/// The window length is measured in 16-bit samples and must be a power of two.
/// Every buffer capacity in the pipeline is derived from it:
///
/// | quantity | value |
/// |---|---|
/// | samples per window ([`short_capacity`](Self::short_capacity)) | `L` |
/// | raw scratch bytes ([`scratch_byte_capacity`](Self::scratch_byte_capacity)) | `2 * L` |
/// | spectrum bins ([`spectrum_capacity`](Self::spectrum_capacity)) | `L / 2 + 1` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformConfig {
    window_length: usize,
    #[cfg_attr(feature = "serialization", serde(default))]
    window_type: WindowType,
    #[cfg_attr(feature = "serialization", serde(default))]
    scaling: SpectrumScaling,
}

impl TransformConfig {
    /// Create a validated configuration with a rectangular window and
    /// [`SpectrumScaling::Magnitude`].
    pub fn new(window_length: usize) -> Result<Self, ParameterError> {
        let config = Self {
            window_length,
            window_type: WindowType::Rectangular,
            scaling: SpectrumScaling::Magnitude,
        };
        config.validate()?;
        Ok(config)
    }

    /// Return a copy using `window_type`.
    pub const fn with_window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    /// Return a copy using `scaling`.
    pub const fn with_scaling(mut self, scaling: SpectrumScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Check that the window length is a power of two within
    /// [`MIN_WINDOW_LENGTH`]..=[`MAX_WINDOW_LENGTH`].
    ///
    /// Configurations built through [`new`](Self::new) are always valid; this is
    /// for values obtained any other way (for instance deserialized ones).
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(MIN_WINDOW_LENGTH..=MAX_WINDOW_LENGTH).contains(&self.window_length) {
            return Err(ParameterError::out_of_range(
                "window_length",
                self.window_length,
                MIN_WINDOW_LENGTH,
                MAX_WINDOW_LENGTH,
            ));
        }
        if !self.window_length.is_power_of_two() {
            return Err(ParameterError::invalid_value(
                "window_length",
                format!("{} is not a power of two", self.window_length),
            ));
        }
        Ok(())
    }

    /// Samples per analysis window.
    pub const fn window_length(&self) -> usize {
        self.window_length
    }

    /// Window function applied before the transform.
    pub const fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Scaling applied to each output bin.
    pub const fn scaling(&self) -> SpectrumScaling {
        self.scaling
    }

    /// Number of `i16` samples the raw scratch holds.
    pub const fn short_capacity(&self) -> usize {
        self.window_length
    }

    /// Size of the raw scratch buffer in bytes.
    pub const fn scratch_byte_capacity(&self) -> usize {
        self.window_length * std::mem::size_of::<i16>()
    }

    /// Number of bins in one spectrum, Nyquist bin included.
    pub const fn spectrum_capacity(&self) -> usize {
        self.window_length / 2 + 1
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            window_type: WindowType::Rectangular,
            scaling: SpectrumScaling::Magnitude,
        }
    }
}
