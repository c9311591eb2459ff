use crate::entity::MalformedAnnotation;
use crate::repository::DataAccessError;
use crate::tagger::TrainingError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Step of a pass during which it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading the partitions from the repository
    Loading,
    /// Rebuilding gold entities from the manual annotations
    Extraction,
    /// Training the model on the corpus of the pass
    Training,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Extraction => write!(f, "extraction"),
            Self::Training => write!(f, "training"),
        }
    }
}

/// Errors aborting a pass.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
    #[error("Profile `{id}`: {source}")]
    MalformedAnnotation {
        id: String,
        #[source]
        source: MalformedAnnotation,
    },
    #[error(transparent)]
    Training(#[from] TrainingError),
}

impl HarnessError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::DataAccess(_) => Stage::Loading,
            Self::MalformedAnnotation { .. } => Stage::Extraction,
            Self::Training(_) => Stage::Training,
        }
    }
}
