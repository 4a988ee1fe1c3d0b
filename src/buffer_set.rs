//! The long-lived scratch buffers shared by every window of one pipeline.

use crate::buffers::{FloatBuffer, NativeBufferFactory, ShortBuffer};
use crate::{TransformConfig, TransformError, TransformResult};

/// Scratch buffers bound to one [`TransformConfig`].
///
/// Two native allocations back the three logical buffers:
///
/// - the raw scratch, `2 * L` bytes, which doubles as the short view holding
///   one window of `L` samples;
/// - the spectrum scratch, `L / 2 + 1` floats.
///
/// Buffers are allocated once in [`initialize`](Self::initialize) and never
/// resized. After [`release_all_buffers`](Self::release_all_buffers) every
/// accessor returns [`TransformError::Misuse`].
///
/// Not synchronised. Sharing one set between threads needs external locking.
#[derive(Debug)]
pub struct TransformBufferSet {
    config: TransformConfig,
    raw_scratch: Option<ShortBuffer>,
    spectrum_scratch: Option<FloatBuffer>,
}

impl TransformBufferSet {
    /// Allocate the scratch buffers for `config`.
    ///
    /// # Errors
    /// [`TransformError::Parameter`] if `config` does not validate and
    /// [`TransformError::Allocation`] if either buffer cannot be allocated.
    pub fn initialize(config: &TransformConfig) -> TransformResult<Self> {
        config.validate()?;
        let raw_scratch = NativeBufferFactory::allocate_shorts(config.short_capacity())?;
        let spectrum_scratch = NativeBufferFactory::allocate_floats(config.spectrum_capacity())?;
        tracing::debug!(
            window_length = config.window_length(),
            scratch_bytes = raw_scratch.byte_capacity(),
            spectrum_bins = spectrum_scratch.capacity(),
            "allocated transform buffers"
        );
        Ok(Self {
            config: *config,
            raw_scratch: Some(raw_scratch),
            spectrum_scratch: Some(spectrum_scratch),
        })
    }

    /// Configuration the buffers were sized from.
    pub const fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Whether the buffers have been released.
    pub const fn is_released(&self) -> bool {
        self.raw_scratch.is_none()
    }

    /// The raw scratch. Use [`ShortBuffer::as_bytes`] for its byte view.
    pub fn raw_scratch(&self) -> TransformResult<&ShortBuffer> {
        self.raw_scratch
            .as_ref()
            .ok_or_else(|| TransformError::released("raw_scratch"))
    }

    /// The live spectrum scratch.
    ///
    /// This aliases the buffer the next transform overwrites; copy it before
    /// running another window if the contents must survive.
    pub fn spectrum(&self) -> TransformResult<&FloatBuffer> {
        self.spectrum_scratch
            .as_ref()
            .ok_or_else(|| TransformError::released("spectrum"))
    }

    /// Borrow the short view and the spectrum scratch together.
    pub fn scratch_mut(&mut self) -> TransformResult<(&mut ShortBuffer, &mut FloatBuffer)> {
        match (self.raw_scratch.as_mut(), self.spectrum_scratch.as_mut()) {
            (Some(raw), Some(spectrum)) => Ok((raw, spectrum)),
            _ => Err(TransformError::released("scratch_mut")),
        }
    }

    /// Release both buffers.
    ///
    /// Cursors are cleared, the raw scratch is deallocated, then the spectrum
    /// scratch. Returns `false` if the buffers were already released, in which
    /// case nothing happens.
    pub fn release_all_buffers(&mut self) -> bool {
        let Some(mut raw) = self.raw_scratch.take() else {
            tracing::debug!("transform buffers already released");
            return false;
        };
        raw.clear();
        drop(raw);

        if let Some(mut spectrum) = self.spectrum_scratch.take() {
            spectrum.clear();
        }
        tracing::debug!(
            window_length = self.config.window_length(),
            "released transform buffers"
        );
        true
    }
}

impl Drop for TransformBufferSet {
    fn drop(&mut self) {
        if !self.is_released() {
            tracing::debug!("transform buffers dropped without explicit release");
            self.release_all_buffers();
        }
    }
}
