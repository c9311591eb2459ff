use ahash::AHashSet;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
};

mod golden;

// Re-exporting
pub use golden::{
    normalize_commas, strip_tags, AlignmentFailure, GoldSpans, GoldenSpanExtractor,
    MalformedAnnotation,
};

/// Closed set of entity categories. Inline tags and tagger labels are always mapped into one of
/// these four; anything unrecognized becomes `Abstract`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Person,
    Location,
    Organization,
    Abstract,
}

impl Category {
    /// Maps the name of an inline annotation tag (e.g. `PER` in `<PER>`) to its category.
    pub fn from_tag<S: AsRef<str>>(tag: S) -> Self {
        match tag.as_ref().trim() {
            "PER" => Self::Person,
            "LOC" | "LOCAL" => Self::Location,
            "ORG" => Self::Organization,
            _ => Self::Abstract,
        }
    }

    /// Name used in the `<START:NAME>` markers of the training corpus.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Person => "PESSOA",
            Self::Location => "LOCAL",
            Self::Organization => "ORGANIZACAO",
            Self::Abstract => "ABSTRACCAO",
        }
    }

    /// Inverse of [`Category::marker`]. Used to read back the labels produced by a tagger.
    pub fn from_marker<S: AsRef<str>>(label: S) -> Self {
        let label = label.as_ref();
        enum_iterator::all::<Category>()
            .find(|c| c.marker() == label)
            .unwrap_or(Self::Abstract)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Organization => "ORGANIZATION",
            Self::Abstract => "ABSTRACT",
        };
        write!(f, "{}", name)
    }
}

/// Key used to compare entities. Only the surface text and the token offsets take part in it;
/// the category does not.
pub type EntityKey<'a> = (&'a str, usize, usize);

/// A named span of a tokenized document. `start` and `end` are token offsets (half-open
/// interval), not character offsets.
///
/// Equality and hashing go through [`Entity::key`]. Two entities holding the same text at the same
/// offsets are equal even when their categories differ: a span found by the tagger counts as found
/// whatever label it was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) text: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) category: Category,
}

impl Entity {
    pub fn new<S: Into<String>>(text: S, start: usize, end: usize, category: Category) -> Self {
        debug_assert!(start <= end);
        Entity {
            text: text.into(),
            start,
            end,
            category,
        }
    }

    pub fn key(&self) -> EntityKey<'_> {
        (self.text.as_str(), self.start, self.end)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn start(&self) -> usize {
        self.start
    }
    pub fn end(&self) -> usize {
        self.end
    }
    pub fn category(&self) -> Category {
        self.category
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by offsets first, then by text.
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start, self.end, self.text.as_str()).cmp(&(
            other.start,
            other.end,
            other.text.as_str(),
        ))
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}) {} => {}",
            self.start, self.end, self.category, self.text
        )
    }
}

pub type EntitySet = AHashSet<Entity>;
