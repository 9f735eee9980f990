//! Multi-threaded back-end of the batch selection

use crate::{
    error::Result,
    inference::InferenceRuntime,
    scheduling::{select_batch, TRACK_BATCH_SIZE},
    selector::{Decision, QualitySelector},
    track::Track,
};

use rayon::prelude::*;

/// Select tracks in multi-threaded mode
///
/// Each batch of tracks is a rayon task. Batch results are gathered in input
/// order, so the output does not depend on how the tasks were scheduled.
///
pub fn run_selection_impl(
    selector: &QualitySelector,
    tracks: &[Track],
    runtime: &(impl InferenceRuntime + ?Sized),
) -> Result<Vec<Decision>> {
    let batches = tracks
        .par_chunks(TRACK_BATCH_SIZE)
        .map(|batch| select_batch(selector, batch, runtime))
        .collect::<Result<Vec<_>>>()?;
    Ok(batches.into_iter().flatten().collect())
}
