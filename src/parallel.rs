//! Parallel spectrum computation over independent inputs.
//!
//! Each rayon worker builds its own [`SpectrumAnalyzer`], so no scratch
//! buffer is ever shared between threads.

use crate::analyzer::SpectrumAnalyzer;
use crate::spectrum::Spectrum;
use crate::strategy::TransformStrategy;
use crate::{TransformConfig, TransformResult};
use rayon::prelude::*;

/// Compute the spectra of every input in parallel.
///
/// The result has one entry per input, in input order, each identical to what
/// a single analyzer would produce for that input alone.
///
/// # Errors
/// The first error hit by any worker, including failure to build a worker's
/// analyzer.
pub fn make_spectra_parallel<S: TransformStrategy>(
    config: &TransformConfig,
    inputs: &[&[i16]],
) -> TransformResult<Vec<Vec<Spectrum>>> {
    config.validate()?;
    let config = *config;
    tracing::debug!(
        inputs = inputs.len(),
        window_length = config.window_length(),
        "computing spectra in parallel"
    );

    inputs
        .par_iter()
        .map_init(
            || SpectrumAnalyzer::<S>::new(config),
            |analyzer, samples| match analyzer {
                Ok(analyzer) => analyzer.make_spectrum(samples),
                Err(err) => Err(err.clone()),
            },
        )
        .collect()
}
