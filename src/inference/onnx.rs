//! ONNX Runtime back-end of learned-model inference

use crate::{
    error::InferenceError,
    inference::{InferenceRuntime, ModelBinding},
    numeric::Float,
};
use ort::{session::Session, value::Tensor};
use std::{
    collections::{hash_map::Entry, HashMap},
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Inference runtime backed by ONNX Runtime
///
/// Sessions are created on first use of a model and kept around for the
/// lifetime of the runtime. Running a session needs exclusive access to it,
/// so concurrent callers are serialized on the session cache.
///
#[derive(Default)]
pub struct OnnxRuntime {
    /// Loaded sessions, keyed by model path
    sessions: Mutex<HashMap<PathBuf, Session>>,
}
//
impl OnnxRuntime {
    /// Set up a runtime with no model loaded yet
    pub fn new() -> Self {
        Self::default()
    }
}

/// Create an ONNX Runtime session for the model at `path`
fn load_session(path: &Path) -> Result<Session, InferenceError> {
    if !path.is_file() {
        return Err(InferenceError::ModelLoad {
            path: path.to_owned(),
            reason: "no such file".to_owned(),
        });
    }
    let session = Session::builder()
        .and_then(|builder| builder.with_intra_threads(1))
        .and_then(|builder| builder.commit_from_file(path))
        .map_err(|e| InferenceError::ModelLoad {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    tracing::info!(model = %path.display(), "Loaded ONNX model");
    Ok(session)
}

/// Number of features that the model input `input_name` takes, if the model
/// declares a fixed width for it
fn declared_width(session: &Session, input_name: &str) -> Option<usize> {
    let input = session.inputs.iter().find(|input| input.name == input_name)?;
    row_width(input.input_type.tensor_shape()?)
}

/// Width of a row-shaped input, i.e. its innermost dimension. Dynamic
/// dimensions are negative and have no width.
fn row_width(shape: &[i64]) -> Option<usize> {
    usize::try_from(*shape.last()?).ok()
}

impl InferenceRuntime for OnnxRuntime {
    fn run(&self, model: &ModelBinding, features: &[Float]) -> Result<Float, InferenceError> {
        let runtime_error = |reason: String| InferenceError::Runtime {
            path: model.path.clone(),
            reason,
        };

        // Fetch the model's session, loading it if this is the first use
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| runtime_error("session cache was poisoned".to_owned()))?;
        let session = match sessions.entry(model.path.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(load_session(&model.path)?),
        };

        if let Some(expected) = declared_width(session, &model.input_name) {
            if expected != features.len() {
                return Err(InferenceError::ShapeMismatch {
                    path: model.path.clone(),
                    expected,
                    found: features.len(),
                });
            }
        }

        // Models are fed one track at a time, as a [1, N] single precision row
        let input = features.iter().map(|&x| x as f32).collect::<Vec<f32>>();
        let tensor = Tensor::from_array(([1usize, input.len()], input))
            .map_err(|e| runtime_error(e.to_string()))?;
        let outputs = session
            .run(ort::inputs![model.input_name.as_str() => tensor])
            .map_err(|e| runtime_error(e.to_string()))?;

        // The model's score is the first element of the requested output
        let output = outputs
            .get(model.output_name.as_str())
            .ok_or_else(|| runtime_error(format!("no output named {}", model.output_name)))?;
        let (_shape, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| runtime_error(e.to_string()))?;
        scores
            .first()
            .map(|&score| score as Float)
            .ok_or_else(|| runtime_error("model produced an empty output".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn binding(path: PathBuf) -> ModelBinding {
        ModelBinding {
            path,
            input_name: "input_1".to_owned(),
            output_name: "Sigmoid_Output_Layer".to_owned(),
        }
    }

    #[test]
    fn missing_model_fails_to_load_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let model = binding(dir.path().join("NN_model.onnx"));
        let runtime = OnnxRuntime::new();
        for _ in 0..2 {
            match runtime.run(&model, &[1.]) {
                Err(InferenceError::ModelLoad { path, .. }) => assert_eq!(path, model.path),
                other => panic!("Unexpected inference outcome: {:?}", other),
            }
        }
        assert!(runtime.sessions.lock().unwrap().is_empty());
    }

    #[test]
    fn corrupt_model_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.onnx");
        fs::write(&path, b"this is not a protobuf").unwrap();
        let runtime = OnnxRuntime::new();
        assert!(matches!(
            runtime.run(&binding(path), &[1., 2.]),
            Err(InferenceError::ModelLoad { .. })
        ));
        assert!(runtime.sessions.lock().unwrap().is_empty());
    }

    #[test]
    fn row_width_is_the_innermost_dimension() {
        assert_eq!(row_width(&[1, 21]), Some(21));
        assert_eq!(row_width(&[-1, 21]), Some(21));
        assert_eq!(row_width(&[1, -1]), None);
        assert_eq!(row_width(&[]), None);
    }
}
