use crate::entity::EntitySet;
use itertools::Itertools;
use std::fmt::Display;

/// A document under evaluation. Entity sets are values: they are set when the profile is built
/// and replaced as a whole, never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    id: String,
    raw_text: String,
    manual_annotation: Option<String>,
    gold: EntitySet,
    predicted: EntitySet,
}

impl Profile {
    pub fn new<S: Into<String>, T: Into<String>>(
        id: S,
        raw_text: T,
        manual_annotation: Option<String>,
    ) -> Self {
        Profile {
            id: id.into(),
            raw_text: raw_text.into(),
            manual_annotation,
            gold: EntitySet::default(),
            predicted: EntitySet::default(),
        }
    }

    pub fn with_gold(self, gold: EntitySet) -> Self {
        Profile { gold, ..self }
    }

    /// Returns the profile with its predictions replaced by `predicted`.
    pub fn with_predicted(self, predicted: EntitySet) -> Self {
        Profile { predicted, ..self }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
    pub fn manual_annotation(&self) -> Option<&str> {
        self.manual_annotation.as_deref()
    }
    pub fn gold(&self) -> &EntitySet {
        &self.gold
    }
    pub fn predicted(&self) -> &EntitySet {
        &self.predicted
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Profile {}", self.id)?;
        writeln!(f, "Gold entities:")?;
        for entity in self.gold.iter().sorted() {
            writeln!(f, "  {}", entity)?;
        }
        writeln!(f, "Predicted entities:")?;
        for entity in self.predicted.iter().sorted() {
            writeln!(f, "  {}", entity)?;
        }
        Ok(())
    }
}
