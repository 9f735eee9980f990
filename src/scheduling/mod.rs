//! This module takes care of scheduling the selection work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{
    error::Result,
    inference::InferenceRuntime,
    selector::{Decision, QualitySelector},
    track::Track,
};

/// Size of the track batches
///
/// Tracks are grouped in batches of a certain size so that the per-task
/// overhead of parallel scheduling stays small compared to the selection
/// work, which can be as cheap as six comparisons per track.
///
const TRACK_BATCH_SIZE: usize = 4_096;

/// Run the quality selection of many tracks in the manner that was configured
/// at build time.
///
/// Decisions come out in the same order as the input tracks. The first error
/// aborts the selection.
///
pub fn run_selection(
    selector: &QualitySelector,
    tracks: &[Track],
    runtime: &(impl InferenceRuntime + ?Sized),
) -> Result<Vec<Decision>> {
    tracing::debug!(
        tracks = tracks.len(),
        batch_size = TRACK_BATCH_SIZE,
        parallel = cfg!(feature = "multi-threading"),
        "Scheduling track selection"
    );

    // Select tracks...
    let decisions = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_selection_impl(selector, tracks, runtime)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_selection_impl(selector, tracks, runtime)
        }
    }?;

    // Some double-checking cannot hurt...
    debug_assert_eq!(decisions.len(), tracks.len());
    Ok(decisions)
}

/// Select one batch of tracks
fn select_batch(
    selector: &QualitySelector,
    batch: &[Track],
    runtime: &(impl InferenceRuntime + ?Sized),
) -> Result<Vec<Decision>> {
    batch
        .iter()
        .map(|track| selector.predict(track, runtime))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{InferenceError, QualityError},
        inference::NoInference,
        numeric::Float,
    };

    fn tracks(count: usize) -> Vec<Track> {
        (0..count)
            .map(|idx| Track {
                pt: (idx % 7) as Float,
                stub_count: 6,
                ..Track::default()
            })
            .collect()
    }

    #[test]
    fn decisions_follow_track_order() {
        let tracks = tracks(3 * TRACK_BATCH_SIZE + 17);
        let decisions = run_selection(&QualitySelector::default(), &tracks, &NoInference).unwrap();
        assert_eq!(decisions.len(), tracks.len());
        for (track, decision) in tracks.iter().zip(decisions) {
            assert_eq!(decision, Decision::Cut(track.pt >= 2.));
        }
    }

    #[test]
    fn model_scores_follow_track_order() {
        let selector = QualitySelector::learned_model(
            "GBDT",
            "m.onnx",
            "in",
            "out",
            vec!["pt".to_owned()],
        );
        let runtime = |features: &[Float]| Ok::<Float, InferenceError>(features[0] / 10.);
        let tracks = tracks(TRACK_BATCH_SIZE + 1);
        let decisions = run_selection(&selector, &tracks, &runtime).unwrap();
        for (track, decision) in tracks.iter().zip(decisions) {
            assert_eq!(decision, Decision::Score(track.pt / 10.));
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let decisions = run_selection(&QualitySelector::default(), &[], &NoInference).unwrap();
        assert!(decisions.is_empty());
    }

    #[test]
    fn errors_abort_the_selection() {
        let selector = QualitySelector::learned_model(
            "NN",
            "m.onnx",
            "in",
            "out",
            vec!["pt".to_owned()],
        );
        assert!(matches!(
            run_selection(&selector, &tracks(10), &NoInference),
            Err(QualityError::Inference(InferenceError::Unavailable(_)))
        ));
    }
}
