/*!
Access to the stored documents. Every document carries an optional manual annotation and an
optional `step`, the pass from which it stops being used for training. A pass reads three
partitions of the store, each keyed and ordered by document id.
*/
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_jsonlines::json_lines;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

/// A stored document, as found in a JSON-lines file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub raw_text: String,
    #[serde(default)]
    pub manual_annotation: Option<String>,
    #[serde(default)]
    pub step: Option<u32>,
}

impl ProfileRow {
    pub fn new<S: Into<String>, T: Into<String>>(
        id: S,
        raw_text: T,
        manual_annotation: Option<&str>,
        step: Option<u32>,
    ) -> Self {
        ProfileRow {
            id: id.into(),
            raw_text: raw_text.into(),
            manual_annotation: manual_annotation.map(String::from),
            step,
        }
    }
}

/// What a partition query returns for each admitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub raw_text: String,
    pub manual_annotation: Option<String>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(value: ProfileRow) -> Self {
        ProfileRecord {
            raw_text: value.raw_text,
            manual_annotation: value.manual_annotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    /// Documents the model is run on: no step yet, or a step not reached by the pass.
    Search,
    /// Annotated documents whose step is before the pass.
    Train,
    /// Annotated documents whose step is at or after the pass.
    Test,
}

impl Partition {
    /// Does the row belong to this partition during `pass`?
    pub fn admits(&self, row: &ProfileRow, pass: u32) -> bool {
        let annotated = row.manual_annotation.is_some();
        match self {
            Self::Search => row.step.map_or(true, |step| step >= pass),
            Self::Train => annotated && row.step.is_some_and(|step| step < pass),
            Self::Test => annotated && row.step.is_some_and(|step| step >= pass),
        }
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepFilter {
    pub partition: Partition,
    pub pass: u32,
}

impl StepFilter {
    pub fn new(partition: Partition, pass: u32) -> Self {
        StepFilter { partition, pass }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("Could not read profiles from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Profile id `{0}` appears more than once")]
    DuplicateId(String),
}

/// Source of the documents of a pass. Implementations return fresh records on every call.
pub trait ProfileRepository {
    fn fetch_profiles(
        &self,
        filter: StepFilter,
    ) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError>;
}

impl<R: ProfileRepository + ?Sized> ProfileRepository for &R {
    fn fetch_profiles(
        &self,
        filter: StepFilter,
    ) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError> {
        (**self).fetch_profiles(filter)
    }
}

/// Keeps the rows admitted by `filter`. Ids must be unique over every row, admitted or not.
fn select<I>(
    rows: I,
    filter: StepFilter,
) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError>
where
    I: IntoIterator<Item = ProfileRow>,
{
    let mut seen = AHashSet::new();
    let mut selected = BTreeMap::new();
    for row in rows {
        if !seen.insert(row.id.clone()) {
            return Err(DataAccessError::DuplicateId(row.id));
        }
        if filter.partition.admits(&row, filter.pass) {
            let id = row.id.clone();
            selected.insert(id, ProfileRecord::from(row));
        }
    }
    tracing::debug!(
        partition = %filter.partition,
        pass = filter.pass,
        profiles = selected.len(),
        "partition fetched"
    );
    Ok(selected)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRepository {
    rows: Vec<ProfileRow>,
}

impl InMemoryRepository {
    pub fn new(rows: Vec<ProfileRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<ProfileRow> for InMemoryRepository {
    fn from_iter<T: IntoIterator<Item = ProfileRow>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ProfileRepository for InMemoryRepository {
    fn fetch_profiles(
        &self,
        filter: StepFilter,
    ) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError> {
        select(self.rows.iter().cloned(), filter)
    }
}

/// Rows stored one JSON object per line. The file is read again on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLinesRepository {
    path: PathBuf,
}

impl JsonLinesRepository {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> DataAccessError {
        DataAccessError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProfileRepository for JsonLinesRepository {
    fn fetch_profiles(
        &self,
        filter: StepFilter,
    ) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError> {
        let rows = json_lines::<ProfileRow, _>(&self.path)
            .map_err(|e| self.io_error(e))?
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| self.io_error(e))?;
        select(rows, filter)
    }
}
