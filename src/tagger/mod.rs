/*!
The tagging model seen by the harness. A [`Tagger`] turns the text of a training corpus into a
fresh model; the model is then only asked to find names in tokenized documents. Training holds no
state between calls: the same corpus always yields an equivalent model.
*/
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod dictionary;
mod samples;

pub use dictionary::{DictionaryModel, DictionaryTagger, CUTOFF_OPTION};
pub use samples::{parse_samples, NameSample, SampleError, DOC_START};

/// Free-form training parameters, passed through to the tagger.
pub type TrainingOptions = BTreeMap<String, String>;

/// A name found by a model: a half-open token interval and the label of the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    pub fn new<S: Into<String>>(start: usize, end: usize, label: S) -> Self {
        Span {
            start,
            end,
            label: label.into(),
        }
    }
}

/// A trained model.
pub trait NameFinder {
    fn find(&self, tokens: &[&str]) -> Vec<Span>;
}

/// Trains a [`NameFinder`] from a corpus in the marker format (`<START:LABEL> ... <END>`).
pub trait Tagger {
    type Model: NameFinder;

    fn train(
        &self,
        label: &str,
        corpus: &str,
        options: &TrainingOptions,
    ) -> Result<Self::Model, TrainingError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainingError {
    #[error("Malformed training sample at line {line}: {reason}")]
    MalformedSample { line: usize, reason: SampleError },
    #[error("Invalid value `{value}` for training option `{key}`")]
    InvalidOption { key: String, value: String },
}
