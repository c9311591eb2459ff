/*!
This library is an incremental evaluation harness for named-entity recognition taggers. It holds
a corpus of biography-like documents, some of them manually annotated with inline markup such as
`<PER>Ana Silva</PER> works at <ORG>Acme</ORG>.`, and measures how a tagger trained on a growing
share of the annotated documents performs on the others.

# PASSES
Every document carries an optional `step`. During pass `n` (from 1 to 4 by default):
* the search partition holds the documents without a step or with `step >= n`;
* the train partition holds the annotated documents with `step < n`;
* the test partition holds the annotated documents with `step >= n`.

A fresh model is trained on a base corpus followed by the train partition, it tags the search
partition, and its predictions are compared with the gold entities of the test partition.

# Terminology
* A category is one of person, location, organization or abstract. Tags map onto it: `PER`,
    `LOC`/`LOCAL`, `ORG`, anything else is abstract.
* An entity is a surface text with a half-open interval `[start, end)` of token offsets. Two
    entities are equal when their text and offsets are equal, whatever their categories.
* Gold entities are rebuilt from the inline markup, aligned on the tokens of the tag-stripped
    text. Predicted entities come from the tagger.
* A score counts the found (predicted and gold), missing (gold only) and wrong (predicted only)
    entities.
*/

mod config;
mod corpus;
mod entity;
mod error;
mod metrics;
mod orchestrator;
mod profile;
mod reporter;
mod repository;
mod tagger;
mod tokenizer;

// The public api starts here
pub use entity::{
    normalize_commas, strip_tags, AlignmentFailure, Category, Entity, EntityKey, EntitySet,
    GoldSpans, GoldenSpanExtractor, MalformedAnnotation,
};

pub use tokenizer::{
    SimpleTokenizer, Tokenizer, TokenizerKind, UnknownTokenizer, WhitespaceTokenizer,
};

pub use tagger::{
    parse_samples, DictionaryModel, DictionaryTagger, NameFinder, NameSample, SampleError, Span,
    Tagger, TrainingError, TrainingOptions, CUTOFF_OPTION, DOC_START,
};

pub use corpus::{rewrite_markup, CorpusBuilder};

pub use profile::Profile;

pub use repository::{
    DataAccessError, InMemoryRepository, JsonLinesRepository, Partition, ProfileRecord,
    ProfileRepository, ProfileRow, StepFilter,
};

pub use metrics::{
    score, DivByZeroStrat, DivisionByZeroError, ParsingDivisionByZeroStrategyError, Score,
};

pub use reporter::{FailedPass, PassReport, Reporter};

pub use config::{
    ConfigError, HarnessConfig, HarnessConfigBuilder, DEFAULT_MODEL_LABEL, DEFAULT_PASSES,
};

pub use error::{HarnessError, Stage};

pub use orchestrator::{PassOrchestrator, PassProfiles, Profiles};

/// Main entrypoint of the library. This function runs every pass configured in `config` over the
/// documents of `repository` and returns the report of the run. The run stops at the first pass
/// that fails; the passes completed before it keep their counts in the returned reporter.
///
/// * `repository`: Source of the documents
/// * `tagger`: Trains the model of every pass
/// * `tokenizer`: Tokenizes the documents, both for gold alignment and for tagging
/// * `base_corpus`: Training corpus shared by every pass, in the `<START:LABEL> ... <END>` format
/// * `config`: Number of passes, model label, training options and division by zero strategy
///
/// #Example
/// ```rust
/// use nerpass::{
///     run_passes_conf, DictionaryTagger, HarnessConfigBuilder, InMemoryRepository, ProfileRow,
///     SimpleTokenizer,
/// };
///
/// let repository = InMemoryRepository::new(vec![
///     ProfileRow::new(
///         "1",
///         "Ana Silva works at Acme.",
///         Some("<PER>Ana Silva</PER> works at <ORG>Acme</ORG>."),
///         Some(1),
///     ),
///     ProfileRow::new(
///         "2",
///         "Acme hired Ana Silva.",
///         Some("<ORG>Acme</ORG> hired <PER>Ana Silva</PER>."),
///         Some(2),
///     ),
/// ]);
/// let config = HarnessConfigBuilder::default().passes(2).build().unwrap();
///
/// let reporter = run_passes_conf(
///     repository,
///     DictionaryTagger::new(SimpleTokenizer),
///     SimpleTokenizer,
///     "",
///     config,
/// );
/// let expected_report = "Pass, Wrong, Found, Missing, Total, Precision, Recall, Fscore
/// 1, 0, 0, 4, 4, 0, 0, 0
/// 2, 0, 2, 0, 2, 1, 1, 1\n";
///
/// assert_eq!(expected_report, reporter.to_string());
/// ```
pub fn run_passes_conf<R, T, K>(
    repository: R,
    tagger: T,
    tokenizer: K,
    base_corpus: &str,
    config: HarnessConfig,
) -> Reporter
where
    R: ProfileRepository,
    T: Tagger,
    K: Tokenizer,
{
    PassOrchestrator::new(repository, tagger, tokenizer, config)
        .with_base_corpus(base_corpus)
        .run()
}
