/*
 * Configuration of a harness run. `HarnessConfig` implements the default trait and can be read
 * from a TOML file, where every missing key keeps its default value. `HarnessConfigBuilder` builds
 * and validates a configuration in code.
*/
use crate::metrics::DivByZeroStrat;
use crate::tagger::TrainingOptions;
use either::Either as LeftOrRight;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Number of passes of a run when none is configured.
pub const DEFAULT_PASSES: u32 = 4;
/// Label given to the models trained by the harness when none is configured.
pub const DEFAULT_MODEL_LABEL: &str = "train";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Passes run, from 1 to `passes` included.
    pub(crate) passes: u32,
    /// Label handed to the tagger with every training corpus.
    pub(crate) model_label: String,
    /// Parameters passed through to the tagger.
    pub(crate) training_options: TrainingOptions,
    /// What the reported precision, recall and fscore become when their denominator is 0.
    pub(crate) zero_division: DivByZeroStrat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            model_label: String::from(DEFAULT_MODEL_LABEL),
            training_options: TrainingOptions::new(),
            zero_division: DivByZeroStrat::ReplaceBy0,
        }
    }
}

impl HarnessConfig {
    pub fn passes(&self) -> u32 {
        self.passes
    }
    pub fn model_label(&self) -> &str {
        &self.model_label
    }
    pub fn training_options(&self) -> &TrainingOptions {
        &self.training_options
    }
    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(content)?;
        config.validate()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns a copy running `passes` passes instead.
    pub fn with_passes(self, passes: u32) -> Result<Self, ConfigError> {
        Self { passes, ..self }.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.passes == 0 {
            return Err(ConfigError::NoPass);
        }
        Ok(self)
    }
}

impl Display for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Passes: {}\n Model label: {}\n Training options: {:?}\n \
             Strategy when encountering a division by zero: {}",
            self.passes, self.model_label, self.training_options, self.zero_division
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read the configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("At least one pass must be run")]
    NoPass,
}

/// This builder can be used to build and customize a `HarnessConfig` structure.
pub struct HarnessConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    passes: u32,
    model_label: String,
    training_options: TrainingOptions,
    zero_division: LeftOrRight<ZeroDiv, DivByZeroStrat>,
}

impl Default for HarnessConfigBuilder<DivByZeroStrat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> HarnessConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    pub fn passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }
    pub fn model_label<S: Into<String>>(mut self, model_label: S) -> Self {
        self.model_label = model_label.into();
        self
    }
    pub fn training_option<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.training_options.insert(key.into(), value.into());
        self
    }
    pub fn division_by_zero(mut self, division_by_zero: ZeroDiv) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }
    pub fn new() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            model_label: String::from(DEFAULT_MODEL_LABEL),
            training_options: TrainingOptions::new(),
            zero_division: LeftOrRight::Right(DivByZeroStrat::ReplaceBy0),
        }
    }
    pub fn build(self) -> Result<HarnessConfig, ConfigError> {
        HarnessConfig {
            passes: self.passes,
            model_label: self.model_label,
            training_options: self.training_options,
            zero_division: self.zero_division.either_into(),
        }
        .validate()
    }
}
