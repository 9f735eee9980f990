//! Failure modes of track quality selection

use crate::selector::ModeKind;
use std::path::PathBuf;

/// The selector was asked to do something its configuration cannot support
///
/// Construction performs no validation, so these errors are reported at the
/// first feature extraction or prediction.
///
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A feature name is not part of the known feature catalogue
    #[error("Unknown feature name \"{0}\"")]
    UnknownFeature(String),

    /// A learned-model selector was configured without any input feature
    #[error("The learned-model selector has no input features configured")]
    NoFeatures,

    /// An operation only makes sense in another selection mode
    #[error("This operation needs a {expected} selector, but this one is {found}")]
    ModeMismatch {
        /// Mode that the operation requires
        expected: ModeKind,
        /// Mode that the selector was built with
        found: ModeKind,
    },
}

/// The inference runtime failed to score a feature vector
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The model artifact could not be loaded
    #[error("Failed to load model from {}: {reason}", .path.display())]
    ModelLoad {
        /// Where the model was looked up
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The feature vector does not have the length that the model expects
    #[error("Model {} expects {expected} input features, got {found}", .path.display())]
    ShapeMismatch {
        /// Model which rejected the input
        path: PathBuf,
        /// Input length declared by the model
        expected: usize,
        /// Length of the feature vector
        found: usize,
    },

    /// The runtime failed while evaluating the model
    #[error("Inference with model {} failed: {reason}", .path.display())]
    Runtime {
        /// Model being evaluated
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// No inference runtime is available in this build
    #[error("No inference runtime available: {0}")]
    Unavailable(String),
}

/// Any failure of the quality selector
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// The selector configuration does not support the requested operation
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The inference runtime failed
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Result type of quality selection operations
pub type Result<T> = std::result::Result<T, QualityError>;
