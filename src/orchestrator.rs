/*!
Runs the passes of an evaluation. Every pass reads its three partitions from the repository,
rebuilds the gold entities of the annotated documents, trains a fresh model on the base corpus
followed by the training documents, runs it over the search documents and compares the result with
the test documents. Passes run in order and nothing but their report outlives them.
*/
use crate::config::HarnessConfig;
use crate::corpus::CorpusBuilder;
use crate::entity::{
    normalize_commas, strip_tags, Category, Entity, EntitySet, GoldenSpanExtractor,
};
use crate::error::HarnessError;
use crate::metrics::score;
use crate::profile::Profile;
use crate::reporter::{FailedPass, PassReport, Reporter};
use crate::repository::{Partition, ProfileRecord, ProfileRepository, StepFilter};
use crate::tagger::{NameFinder, Tagger};
use crate::tokenizer::Tokenizer;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Profiles of a pass, keyed and ordered by id.
pub type Profiles = BTreeMap<String, Profile>;

/// The three partitions of a pass, with gold entities for the annotated ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassProfiles {
    pub search: Profiles,
    pub train: Profiles,
    pub test: Profiles,
    /// Gold mentions of `train` and `test` left out because they could not be aligned
    pub unaligned: usize,
}

pub struct PassOrchestrator<R, T, K> {
    repository: R,
    tagger: T,
    tokenizer: K,
    base_corpus: String,
    config: HarnessConfig,
}

impl<R, T, K> PassOrchestrator<R, T, K>
where
    R: ProfileRepository,
    T: Tagger,
    K: Tokenizer,
{
    pub fn new(repository: R, tagger: T, tokenizer: K, config: HarnessConfig) -> Self {
        PassOrchestrator {
            repository,
            tagger,
            tokenizer,
            base_corpus: String::new(),
            config,
        }
    }

    /// Corpus every training corpus starts with. Empty by default.
    pub fn with_base_corpus<S: Into<String>>(self, base_corpus: S) -> Self {
        PassOrchestrator {
            base_corpus: base_corpus.into(),
            ..self
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs every configured pass. The run stops at the first pass that fails; the reporter then
    /// holds the passes completed before it and the failure.
    pub fn run(&self) -> Reporter {
        let mut reporter = Reporter::new(self.config.zero_division());
        for pass in 1..=self.config.passes() {
            match self.run_pass(pass) {
                Ok(report) => reporter.push(report),
                Err(err) => {
                    error!(pass, stage = %err.stage(), "{}", err);
                    reporter.fail(FailedPass {
                        pass,
                        stage: err.stage(),
                        message: err.to_string(),
                    });
                    break;
                }
            }
        }
        reporter
    }

    pub fn run_pass(&self, pass: u32) -> Result<PassReport, HarnessError> {
        let PassProfiles {
            search,
            train,
            test,
            unaligned,
        } = self.load(pass)?;
        let search = self.find_ners(search, &train)?;
        let mut report = self.calculate_precision(&search, &test, pass);
        report.unaligned_entities = unaligned;
        Ok(report)
    }

    /// Reads the partitions of `pass`. A malformed annotation in the training or test documents
    /// fails the load.
    pub fn load(&self, pass: u32) -> Result<PassProfiles, HarnessError> {
        let search = self
            .repository
            .fetch_profiles(StepFilter::new(Partition::Search, pass))?;
        let test = self
            .repository
            .fetch_profiles(StepFilter::new(Partition::Test, pass))?;
        let train = self
            .repository
            .fetch_profiles(StepFilter::new(Partition::Train, pass))?;

        let mut unaligned = 0;
        let search = search
            .into_iter()
            .map(|(id, record)| {
                let profile = Profile::new(id.as_str(), record.raw_text, record.manual_annotation);
                (id, profile)
            })
            .collect();
        let train = self.with_gold(train, &mut unaligned)?;
        let test = self.with_gold(test, &mut unaligned)?;
        Ok(PassProfiles {
            search,
            train,
            test,
            unaligned,
        })
    }

    fn with_gold(
        &self,
        records: BTreeMap<String, ProfileRecord>,
        unaligned: &mut usize,
    ) -> Result<Profiles, HarnessError> {
        let extractor = GoldenSpanExtractor::new(&self.tokenizer);
        let mut profiles = Profiles::new();
        for (id, record) in records {
            let gold = match record.manual_annotation.as_deref() {
                Some(annotation) => {
                    let spans = extractor.extract(annotation).map_err(|source| {
                        HarnessError::MalformedAnnotation {
                            id: id.clone(),
                            source,
                        }
                    })?;
                    for failure in spans.unaligned.iter() {
                        warn!(profile = %id, "gold entity skipped: {}", failure);
                    }
                    *unaligned += spans.unaligned.len();
                    spans.into_set()
                }
                None => EntitySet::default(),
            };
            let profile = Profile::new(id.as_str(), record.raw_text, record.manual_annotation)
                .with_gold(gold);
            profiles.insert(id, profile);
        }
        Ok(profiles)
    }

    /// Trains a model on the base corpus and the training profiles, then replaces the predictions
    /// of every search profile by what the model finds in its raw text. Raw texts are tokenized
    /// like the annotations: tags removed and commas detached, so that predicted offsets line up
    /// with gold offsets.
    pub fn find_ners(&self, search: Profiles, train: &Profiles) -> Result<Profiles, HarnessError> {
        let corpus = CorpusBuilder::new(&self.base_corpus).build(train.values());
        let model = self.tagger.train(
            self.config.model_label(),
            &corpus,
            self.config.training_options(),
        )?;
        Ok(search
            .into_iter()
            .map(|(id, profile)| {
                let predicted = self.predict(&model, &profile);
                (id, profile.with_predicted(predicted))
            })
            .collect())
    }

    fn predict<M: NameFinder>(&self, model: &M, profile: &Profile) -> EntitySet {
        let text = normalize_commas(&strip_tags(profile.raw_text()));
        let tokens = self.tokenizer.tokenize(&text);
        model
            .find(&tokens)
            .into_iter()
            .filter_map(|span| {
                if span.start > span.end || span.end > tokens.len() {
                    warn!(
                        profile = profile.id(),
                        start = span.start,
                        end = span.end,
                        tokens = tokens.len(),
                        "predicted span out of bounds, dropped"
                    );
                    return None;
                }
                Some(Entity::new(
                    tokens[span.start..span.end].join(" "),
                    span.start,
                    span.end,
                    Category::from_marker(&span.label),
                ))
            })
            .collect()
    }

    /// Compares the predictions of the search profiles with the gold entities of the test
    /// profiles sharing their id, in id order. A test profile without a search counterpart is
    /// skipped and reported.
    pub fn calculate_precision(&self, search: &Profiles, test: &Profiles, pass: u32) -> PassReport {
        let mut report = PassReport::new(pass);
        for (id, expected) in test.iter() {
            let Some(actual) = search.get(id) else {
                warn!(pass, profile = %id, "no search profile for test profile, skipped");
                report.missing_counterparts.push(id.clone());
                continue;
            };
            let profile_score = score(actual.predicted(), expected.gold());
            debug!(pass, profile = %id, "{}", profile_score);
            report.score += profile_score;
            report.scored_profiles += 1;
        }
        info!(
            pass,
            wrong = report.score.wrong,
            found = report.score.found,
            missing = report.score.missing,
            total = report.score.total(),
            "{}",
            report
        );
        report
    }
}
