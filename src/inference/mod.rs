//! Interface to the runtime which evaluates learned models
//!
//! The quality selector never evaluates a model by itself. It hands a feature
//! vector to an [`InferenceRuntime`] and gets a single score back. Any
//! `Fn(&[Float]) -> Result<Float, InferenceError>` closure qualifies as a
//! runtime, which is handy for deterministic stand-ins.

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxRuntime;

use crate::{error::InferenceError, numeric::Float};
use std::path::PathBuf;

/// Location of a serialized model and the names of its input/output bindings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelBinding {
    /// Filesystem location of the serialized model
    pub path: PathBuf,

    /// Name of the model's input tensor
    pub input_name: String,

    /// Name of the model's output tensor
    pub output_name: String,
}

/// Something which can score a feature vector with a given model
///
/// Implementations must tolerate concurrent calls, since a selector may be
/// shared between threads. How the model is loaded and cached is up to the
/// implementation.
///
pub trait InferenceRuntime: Sync {
    /// Evaluate `model` on `features`, returning its single scalar output
    fn run(&self, model: &ModelBinding, features: &[Float]) -> Result<Float, InferenceError>;
}

impl<F> InferenceRuntime for F
where
    F: Fn(&[Float]) -> Result<Float, InferenceError> + Sync,
{
    fn run(&self, _model: &ModelBinding, features: &[Float]) -> Result<Float, InferenceError> {
        self(features)
    }
}

/// Runtime stand-in for builds without any inference backend
///
/// Good enough for cut-based selection, which never calls the runtime.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInference;
//
impl InferenceRuntime for NoInference {
    fn run(&self, model: &ModelBinding, _features: &[Float]) -> Result<Float, InferenceError> {
        Err(InferenceError::Unavailable(format!(
            "cannot evaluate {}, this build has no inference backend (enable the \"onnx\" feature)",
            model.path.display()
        )))
    }
}

/// Set up the inference runtime that was configured at build time
pub fn default_runtime() -> Box<dyn InferenceRuntime> {
    #[cfg(feature = "onnx")]
    {
        Box::new(OnnxRuntime::new())
    }

    #[cfg(not(feature = "onnx"))]
    {
        Box::new(NoInference)
    }
}
