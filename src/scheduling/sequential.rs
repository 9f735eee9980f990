//! Sequential back-end of the batch selection

use crate::{
    error::Result,
    inference::InferenceRuntime,
    scheduling::{select_batch, TRACK_BATCH_SIZE},
    selector::{Decision, QualitySelector},
    track::Track,
};

/// Select tracks in sequential mode
///
/// We use batched logic even in sequential mode, so that both back-ends walk
/// through the tracks in the same way.
///
pub fn run_selection_impl(
    selector: &QualitySelector,
    tracks: &[Track],
    runtime: &(impl InferenceRuntime + ?Sized),
) -> Result<Vec<Decision>> {
    let mut decisions = Vec::with_capacity(tracks.len());
    for batch in tracks.chunks(TRACK_BATCH_SIZE) {
        decisions.extend(select_batch(selector, batch, runtime)?);
    }
    Ok(decisions)
}
