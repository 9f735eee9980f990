//! Mechanism for loading the quality selection configuration
//!
//! The configuration file holds one `key value` pair per line, using the
//! parameter names of the tracklet emulation's track producer:
//!
//! ```text
//! Quality           True     # False disables quality selection
//! Quality_Algorithm NN       # None, Cut, NN or GBDT
//! ONNXmodel         ML_data/FakeIDNN/NN_model.onnx
//! ONNXInputName     input_1
//! ONNXOutputName    Sigmoid_Output_Layer
//! in_features       log_chi2, log_bendchi2, nstubs, z0
//! maxZ0             15.      # in cm
//! maxEta            2.4
//! chi2dofMax        40.
//! bendchi2Max       2.4
//! minPt             2.       # in GeV
//! nStubsmin         4
//! mvaThreshold      0.5
//! rocPoints         30
//! ```
//!
//! Any key may be omitted, in which case its default value is used.

use crate::{cuts::CutParameters, numeric::Float, selector::QualitySelector};

use eyre::{bail, ensure, Result, WrapErr};

use std::{collections::HashMap, fs, path::Path, str::FromStr};

/// Default score threshold above which learned-model selection keeps a track
pub const DEFAULT_MVA_THRESHOLD: Float = 0.5;

/// Default number of points on the ROC curve
pub const DEFAULT_ROC_POINTS: usize = 30;

/// Every configuration key that the loader understands
const KNOWN_KEYS: [&str; 14] = [
    "Quality",
    "Quality_Algorithm",
    "ONNXmodel",
    "ONNXInputName",
    "ONNXOutputName",
    "in_features",
    "maxZ0",
    "maxEta",
    "chi2dofMax",
    "bendchi2Max",
    "minPt",
    "nStubsmin",
    "mvaThreshold",
    "rocPoints",
];

/// Quality selection configuration
#[derive(Debug)]
pub struct Configuration {
    /// Whether quality selection should run at all
    pub enabled: bool,

    /// Track quality selector
    pub selector: QualitySelector,

    /// Score threshold above which learned-model selection keeps a track
    pub mva_threshold: Float,

    /// Number of points on the ROC curve
    pub roc_points: usize,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and log it
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Failed to read {}", file_name.display()))?;
        let config = config_str.parse::<Self>()?;
        config.log();
        Ok(config)
    }

    /// Log the configuration
    pub fn log(&self) {
        tracing::info!(enabled = self.enabled, selector = %self.selector, "Quality selection");
        tracing::info!(
            mva_threshold = self.mva_threshold,
            roc_points = self.roc_points,
            "Performance evaluation"
        );
    }
}

impl FromStr for Configuration {
    type Err = eyre::Report;

    /// Decode configuration text
    fn from_str(config_str: &str) -> Result<Self> {
        // Each configuration item sits on its own line, key first. Blank
        // lines and everything after a '#' are ignored.
        let mut items = HashMap::new();
        for (line_idx, line) in config_str.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let (key, data) = line
                .split_once(char::is_whitespace)
                .map(|(key, data)| (key, data.trim()))
                .unwrap_or((line, ""));
            let Some(&name) = KNOWN_KEYS.iter().find(|&&known| known == key) else {
                bail!("Unknown configuration key {} on line {}", key, line_idx + 1);
            };
            let previous = items.insert(name, ConfigItem::new(name, data));
            ensure!(previous.is_none(), "Duplicate configuration of {}", name);
        }

        // This closure fetches a configuration item, falling back to the
        // default value of the tracking producer if it's not configured.
        let item = |name: &'static str, default: &'static str| {
            items
                .get(name)
                .copied()
                .unwrap_or_else(|| ConfigItem::new(name, default))
        };

        // Decode the configuration items into concrete values
        let enabled = item("Quality", "True").parse_bool()?;
        let algorithm = item("Quality_Algorithm", "None").data;
        let selector = match algorithm {
            "None" => QualitySelector::default(),
            "Cut" => QualitySelector::cut_based(
                algorithm,
                CutParameters::new(
                    item("maxZ0", "15").parse::<Float>()?,
                    item("maxEta", "2.4").parse::<Float>()?,
                    item("chi2dofMax", "40").parse::<Float>()?,
                    item("bendchi2Max", "2.4").parse::<Float>()?,
                    item("minPt", "2").parse::<Float>()?,
                    item("nStubsmin", "4").parse::<i32>()?,
                ),
            ),
            "NN" | "GBDT" => {
                let model = item("ONNXmodel", "").data;
                ensure!(
                    !model.is_empty(),
                    "Algorithm {} needs a model, please configure ONNXmodel",
                    algorithm
                );
                QualitySelector::learned_model(
                    algorithm,
                    model,
                    item("ONNXInputName", "input_1").data,
                    item("ONNXOutputName", "Sigmoid_Output_Layer").data,
                    item("in_features", "").parse_list(),
                )
            }
            other => bail!(
                "Unsupported Quality_Algorithm {}, expected None, Cut, NN or GBDT",
                other
            ),
        };
        let config = Configuration {
            enabled,
            selector,
            mva_threshold: item("mvaThreshold", "0.5").parse::<Float>()?,
            roc_points: item("rocPoints", "30").parse::<usize>()?,
        };

        // The selector itself only notices bad feature lists on the first
        // track, but at configuration time we can afford to be stricter.
        if config.enabled && algorithm != "None" && algorithm != "Cut" {
            config
                .selector
                .validate()
                .wrap_err("Invalid learned-model configuration")?;
        }

        // A ROC curve needs at least one point
        ensure!(config.roc_points > 0, "Please ask for at least one ROC point");

        Ok(config)
    }
}

impl Default for Configuration {
    /// Default cut-based selection and performance evaluation
    fn default() -> Self {
        Self {
            enabled: true,
            selector: QualitySelector::default(),
            mva_threshold: DEFAULT_MVA_THRESHOLD,
            roc_points: DEFAULT_ROC_POINTS,
        }
    }
}

/// A value from the configuration file, tagged with the key which it is
/// associated with for error reporting purposes.
#[derive(Clone, Copy)]
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a key and raw line data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data using special logic which handles Python's bool syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data {
            "True" | "1" => Ok(true),
            "False" | "0" => Ok(false),
            // Delegate other booleans to the standard Rust parser
            _ => self.parse::<bool>(),
        }
    }

    /// Parse this data as a list of names separated by commas or whitespace
    fn parse_list(self) -> Vec<String> {
        self.data
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|name| name.trim_matches(|c: char| c == '"' || c == '\'' || c == '[' || c == ']'))
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
