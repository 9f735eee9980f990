//! Track quality: telling genuine L1 tracks from fakes
//!
//!
//! # Introduction (for the physicist)
//!
//! The Level-1 track finder builds tracks out of stubs, pairs of hits in
//! closely spaced silicon sensors. In a busy bunch crossing, a fair share of
//! the resulting tracks are fakes: random stub combinations which happened to
//! fit a helix. Quality selection flags them, so that downstream trigger
//! algorithms can drop them.
//!
//! Two flavours of selection are supported. The historical one applies cuts on
//! the track fit summary (impact parameter, pseudorapidity, fit chi-squares,
//! transverse momentum, stub count). The newer one feeds a set of track
//! quantities to a trained classifier (neural network or boosted decision
//! trees) and uses its output as a quality score.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The core of this crate is [`QualitySelector`], an immutable description of
//! the selection to be performed. It knows how to turn a [`Track`] into a
//! feature vector, and how to turn that into a [`Decision`]. Model evaluation
//! itself is delegated to an [`InferenceRuntime`], which can be ONNX Runtime
//! (with the "onnx" feature) or anything else that maps a feature vector to a
//! score.
//!
//! Around this core, the crate provides what a standalone selection job needs:
//! configuration loading, track table reading, batch scheduling (optionally
//! multi-threaded), performance evaluation, and results output.

#![warn(missing_docs)]

pub mod config;
pub mod cuts;
pub mod error;
pub mod features;
pub mod inference;
pub mod ntuple;
pub mod numeric;
pub mod output;
pub mod performance;
pub mod scheduling;
pub mod selector;
pub mod track;

pub use crate::{
    cuts::CutParameters,
    error::{ConfigurationError, InferenceError, QualityError},
    features::Feature,
    inference::{InferenceRuntime, ModelBinding, NoInference},
    numeric::Float,
    selector::{Decision, Mode, ModeKind, ModelParameters, QualitySelector},
    track::{HitPattern, Track},
};
