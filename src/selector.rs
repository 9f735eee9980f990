//! Quality selection of reconstructed tracks
//!
//! A [`QualitySelector`] decides how much a track looks like a genuine
//! particle trajectory rather than a fake combination of stubs. It does so in
//! one of two ways, chosen once and for all at construction:
//!
//! - Cut-based selection compares a handful of fit summary quantities to
//!   fixed thresholds and gives a yes/no answer.
//! - Learned-model selection turns the track into a feature vector and lets
//!   an external inference runtime compute a score, usually in [0, 1].
//!
//! The selector holds no mutable state, so it can be shared by any number of
//! threads as long as the inference runtime supports it.

use crate::{
    cuts::CutParameters,
    error::{ConfigurationError, Result},
    features::Feature,
    inference::{InferenceRuntime, ModelBinding},
    numeric::Float,
    track::Track,
};
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/// Kind of selection performed by a selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    /// Threshold cuts on the track fit summary
    CutBased,
    /// Score computed by a learned model
    LearnedModel,
}

impl Display for ModeKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKind::CutBased => write!(fmt, "cut-based"),
            ModeKind::LearnedModel => write!(fmt, "learned-model"),
        }
    }
}

/// Parameters of learned-model selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelParameters {
    /// Model to be evaluated
    pub binding: ModelBinding,

    /// Names of the track quantities fed to the model, in input order
    pub feature_names: Vec<String>,

    /// Outcome of decoding `feature_names`, reported on first use
    features: std::result::Result<Vec<Feature>, ConfigurationError>,
}
//
impl ModelParameters {
    /// Bundle a model with its input features
    fn new(binding: ModelBinding, feature_names: Vec<String>) -> Self {
        let features = decode_features(&feature_names);
        Self {
            binding,
            feature_names,
            features,
        }
    }
}

/// Decode a list of feature names, which must not be empty
fn decode_features(names: &[String]) -> std::result::Result<Vec<Feature>, ConfigurationError> {
    if names.is_empty() {
        return Err(ConfigurationError::NoFeatures);
    }
    names.iter().map(|name| name.parse::<Feature>()).collect()
}

/// Selection mode, along with the parameters that this mode needs
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    /// Threshold cuts on the track fit summary
    CutBased(CutParameters),
    /// Score computed by a learned model
    LearnedModel(ModelParameters),
}
//
impl Mode {
    /// Kind of selection performed in this mode
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::CutBased(_) => ModeKind::CutBased,
            Mode::LearnedModel(_) => ModeKind::LearnedModel,
        }
    }
}

/// Outcome of the quality selection of one track
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// Verdict of cut-based selection
    Cut(bool),
    /// Raw score of learned-model selection, without any calibration
    Score(Float),
}
//
impl Decision {
    /// Express the decision as a score, cut verdicts mapping to 1 or 0
    pub fn score(self) -> Float {
        match self {
            Decision::Cut(true) => 1.,
            Decision::Cut(false) => 0.,
            Decision::Score(score) => score,
        }
    }

    /// Truth that the track is kept, scores being accepted strictly above
    /// `threshold` (which does not affect cut verdicts)
    pub fn accepted(self, threshold: Float) -> bool {
        match self {
            Decision::Cut(keep) => keep,
            Decision::Score(score) => score > threshold,
        }
    }
}

/// Track quality selector
#[derive(Clone, Debug, PartialEq)]
pub struct QualitySelector {
    /// Name of the selection algorithm, for bookkeeping purposes
    algorithm: String,

    /// How tracks are selected
    mode: Mode,
}
//
impl QualitySelector {
    /// Set up a cut-based selector
    ///
    /// Cut values are taken as they are, without any sanity check.
    ///
    pub fn cut_based(algorithm: impl Into<String>, cuts: CutParameters) -> Self {
        Self {
            algorithm: algorithm.into(),
            mode: Mode::CutBased(cuts),
        }
    }

    /// Set up a learned-model selector
    ///
    /// The model is not looked at here. Feature names are decoded right away,
    /// but problems with them are only reported when tracks are first
    /// processed, or by [`validate()`](Self::validate).
    ///
    pub fn learned_model(
        algorithm: impl Into<String>,
        model_path: impl Into<PathBuf>,
        input_name: impl Into<String>,
        output_name: impl Into<String>,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            mode: Mode::LearnedModel(ModelParameters::new(
                ModelBinding {
                    path: model_path.into(),
                    input_name: input_name.into(),
                    output_name: output_name.into(),
                },
                feature_names,
            )),
        }
    }

    /// Name of the selection algorithm
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Selection mode and its parameters
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Check ahead of time the configuration problems that feature
    /// extraction would otherwise report on the first track
    pub fn validate(&self) -> Result<()> {
        self.features().map(|_| ())
    }

    /// Decoded feature list, or the error that decoding ran into
    fn features(&self) -> Result<&[Feature]> {
        self.model_parameters()?
            .features
            .as_deref()
            .map_err(|e| e.clone().into())
    }

    /// Access the learned-model parameters, or complain about the mode
    fn model_parameters(&self) -> Result<&ModelParameters> {
        match &self.mode {
            Mode::LearnedModel(params) => Ok(params),
            Mode::CutBased(_) => Err(ConfigurationError::ModeMismatch {
                expected: ModeKind::LearnedModel,
                found: ModeKind::CutBased,
            }
            .into()),
        }
    }

    /// Compute the feature vector which the learned model is fed with
    ///
    /// Entries follow the order of the configured feature names. Only
    /// meaningful for learned-model selectors.
    ///
    pub fn feature_transform(&self, track: &Track) -> Result<Vec<Float>> {
        Ok(self
            .features()?
            .iter()
            .map(|feature| feature.value(track))
            .collect())
    }

    /// Evaluate the quality of a track
    ///
    /// Cut-based selectors never call the runtime. Learned-model selectors
    /// return the runtime's output unchanged, thresholding it is up to the
    /// caller.
    ///
    pub fn predict(
        &self,
        track: &Track,
        runtime: &(impl InferenceRuntime + ?Sized),
    ) -> Result<Decision> {
        match &self.mode {
            Mode::CutBased(cuts) => Ok(Decision::Cut(cuts.keep(track))),
            Mode::LearnedModel(params) => {
                let features = self.feature_transform(track)?;
                let score = runtime.run(&params.binding, &features)?;
                Ok(Decision::Score(score))
            }
        }
    }
}

impl Default for QualitySelector {
    /// Cut-based selection with the default cuts
    fn default() -> Self {
        Self::cut_based("None", CutParameters::default())
    }
}

impl Display for QualitySelector {
    /// Describe the selector on a single line
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} ({}", self.algorithm, self.mode.kind())?;
        match &self.mode {
            Mode::CutBased(cuts) => write!(
                fmt,
                ": |z0| <= {}, |eta| <= {}, chi2/dof <= {}, bendchi2 <= {}, pt >= {}, stubs >= {})",
                cuts.max_z0,
                cuts.max_eta,
                cuts.max_chi2_per_dof,
                cuts.max_bend_chi2,
                cuts.min_pt,
                cuts.min_stub_count,
            ),
            Mode::LearnedModel(params) => write!(
                fmt,
                ": {} [{} -> {}], features {})",
                params.binding.path.display(),
                params.binding.input_name,
                params.binding.output_name,
                params.feature_names.join(","),
            ),
        }
    }
}
