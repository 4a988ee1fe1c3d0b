// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # AudioSpectrum
//!
//! Windowed spectral transforms over streams of signed 16-bit samples.
//!
//! Input samples are cut into fixed windows, each window is run through a
//! pluggable [`TransformStrategy`], and every window yields an owned
//! [`Spectrum`] of `L / 2 + 1` bins. The scratch buffers the transform works
//! in are allocated once per [`SpectrumAnalyzer`] and reused for every window.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! audio_spectrum = "0.1.0"
//! ```
//!
//! ## Features
//!
//! - `serialization`: serde support for [`TransformConfig`] and its enums
//! - `parallel-processing`: [`make_spectra_parallel`] using `rayon`
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_spectrum::{FftStrategy, SpectrumAnalyzer, TransformConfig, WindowType};
//!
//! let config = TransformConfig::new(1024)?.with_window_type(WindowType::Hanning);
//! let mut analyzer = SpectrumAnalyzer::<FftStrategy>::new(config)?;
//!
//! // 1500 samples: one full window, the trailing 476 samples are dropped
//! let samples = vec![0i16; 1500];
//! let spectra = analyzer.make_spectrum(&samples)?;
//! assert_eq!(spectra.len(), 1);
//! assert_eq!(spectra[0].len(), 513);
//!
//! analyzer.finish();
//! # Ok::<(), audio_spectrum::TransformError>(())
//! ```
//!
//! ## Segmentation
//!
//! With `n` input samples and a window length `L`:
//!
//! - `n <= L` gives exactly one window. A window shorter than `L` is
//!   zero-padded, so an empty input is transformed as silence.
//! - `n > L` gives `n / L` windows; a trailing partial window is dropped.
//!
//! ## Error Handling
//!
//! ```rust
//! use audio_spectrum::{FftStrategy, ParameterError, SpectrumAnalyzer, TransformError};
//!
//! match SpectrumAnalyzer::<FftStrategy>::with_window_length(1000) {
//!     Err(TransformError::Parameter(ParameterError::InvalidValue { parameter, .. })) => {
//!         assert_eq!(parameter, "window_length");
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! ## Threading
//!
//! An analyzer owns mutable scratch state and is meant to be used from one
//! thread at a time. Independent analyzers share nothing, so one per thread
//! is always safe.

pub mod analyzer;
pub mod buffer_set;
pub mod buffers;
pub mod config;
pub mod error;
#[cfg(feature = "parallel-processing")]
pub mod parallel;
pub mod segmenter;
pub mod spectrum;
pub mod strategy;
pub mod window;

pub use analyzer::SpectrumAnalyzer;
pub use buffer_set::TransformBufferSet;
pub use buffers::{FloatBuffer, NativeBuffer, NativeBufferFactory, ShortBuffer};
pub use config::{
    DEFAULT_WINDOW_LENGTH, MAX_WINDOW_LENGTH, MIN_WINDOW_LENGTH, SpectrumScaling, TransformConfig,
};
pub use error::{ParameterError, TransformError, TransformResult};
#[cfg(feature = "parallel-processing")]
pub use parallel::make_spectra_parallel;
pub use segmenter::WindowSegmenter;
pub use spectrum::{Spectrum, bin_frequency, spectrogram};
pub use strategy::{DftStrategy, FftStrategy, TransformStrategy};
pub use window::WindowType;
