use nerpass::{
    run_passes_conf, Category, DataAccessError, DictionaryTagger, DivByZeroStrat, Entity,
    GoldenSpanExtractor, HarnessConfig, HarnessConfigBuilder, InMemoryRepository,
    JsonLinesRepository, Partition, PassOrchestrator, ProfileRecord, ProfileRepository,
    ProfileRow, Reporter, Score, SimpleTokenizer, Stage, StepFilter, WhitespaceTokenizer,
};
use std::collections::BTreeMap;

const ANNOTATION: &str = "<PER>Ana Silva</PER> works at <ORG>Acme</ORG>.";
const RAW: &str = "Ana Silva works at Acme.";

#[test]
fn predictions_recover_gold_spans_of_the_training_text() {
    let repository = InMemoryRepository::new(vec![
        ProfileRow::new("train", RAW, Some(ANNOTATION), Some(1)),
        ProfileRow::new("search", RAW, None, None),
    ]);
    let harness = PassOrchestrator::new(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        HarnessConfig::default(),
    );
    let loaded = harness.load(2).unwrap();
    assert_eq!(loaded.train.len(), 1);
    let search = harness.find_ners(loaded.search, &loaded.train).unwrap();
    let predicted = search["search"].predicted();

    let gold = GoldenSpanExtractor::new(SimpleTokenizer)
        .extract(ANNOTATION)
        .unwrap()
        .into_set();
    assert_eq!(predicted, &gold);

    let mut entities: Vec<_> = predicted.iter().collect();
    entities.sort();
    assert_eq!(entities[0], &Entity::new("Ana Silva", 0, 2, Category::Person));
    assert_eq!(entities[0].category(), Category::Person);
    assert_eq!(entities[1], &Entity::new("Acme", 4, 5, Category::Organization));
    assert_eq!(entities[1].category(), Category::Organization);
}

#[test]
fn predictions_on_tagged_raw_text_line_up_with_gold_offsets() {
    let repository = InMemoryRepository::new(vec![
        ProfileRow::new("train", ANNOTATION, Some(ANNOTATION), Some(1)),
        ProfileRow::new("search", ANNOTATION, None, None),
    ]);
    let harness = PassOrchestrator::new(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        HarnessConfig::default(),
    );
    let loaded = harness.load(2).unwrap();
    let search = harness.find_ners(loaded.search, &loaded.train).unwrap();

    let gold = GoldenSpanExtractor::new(SimpleTokenizer)
        .extract(ANNOTATION)
        .unwrap()
        .into_set();
    assert_eq!(search["search"].predicted(), &gold);
    assert!(gold.contains(&Entity::new("Ana Silva", 0, 2, Category::Person)));
    assert!(gold.contains(&Entity::new("Acme", 4, 5, Category::Organization)));
}

#[test]
fn step_two_moves_from_test_to_train_after_pass_two() {
    let repository = InMemoryRepository::new(vec![ProfileRow::new(
        "p",
        RAW,
        Some(ANNOTATION),
        Some(2),
    )]);
    let admitted = |partition, pass| {
        repository
            .fetch_profiles(StepFilter::new(partition, pass))
            .unwrap()
            .contains_key("p")
    };
    let search: Vec<bool> = (1..=4).map(|pass| admitted(Partition::Search, pass)).collect();
    let train: Vec<bool> = (1..=4).map(|pass| admitted(Partition::Train, pass)).collect();
    let test: Vec<bool> = (1..=4).map(|pass| admitted(Partition::Test, pass)).collect();
    assert_eq!(search, vec![true, true, false, false]);
    assert_eq!(train, vec![false, false, true, true]);
    assert_eq!(test, vec![true, true, false, false]);
}

/// Hides some ids from the search partition, and serves a broken annotation from a given pass.
struct Tampered {
    inner: InMemoryRepository,
    hidden_from_search: &'static [&'static str],
    broken_from: u32,
}

impl ProfileRepository for Tampered {
    fn fetch_profiles(
        &self,
        filter: StepFilter,
    ) -> Result<BTreeMap<String, ProfileRecord>, DataAccessError> {
        let mut records = self.inner.fetch_profiles(filter)?;
        if filter.partition == Partition::Search {
            for id in self.hidden_from_search {
                records.remove(*id);
            }
        }
        if filter.partition == Partition::Test && filter.pass >= self.broken_from {
            records.insert(
                String::from("broken"),
                ProfileRecord {
                    raw_text: String::from("Ana"),
                    manual_annotation: Some(String::from("<PER>Ana")),
                },
            );
        }
        Ok(records)
    }
}

fn rows() -> Vec<ProfileRow> {
    vec![
        ProfileRow::new("1", RAW, Some(ANNOTATION), Some(1)),
        ProfileRow::new(
            "2",
            "Acme hired Ana Silva.",
            Some("<ORG>Acme</ORG> hired <PER>Ana Silva</PER>."),
            Some(4),
        ),
        ProfileRow::new(
            "3",
            "Rui left Acme.",
            Some("<PER>Rui</PER> left <ORG>Acme</ORG>."),
            Some(4),
        ),
    ]
}

#[test]
fn missing_counterpart_is_reported_and_the_pass_continues() {
    let repository = Tampered {
        inner: InMemoryRepository::new(rows()),
        hidden_from_search: &["2"],
        broken_from: u32::MAX,
    };
    let config = HarnessConfigBuilder::default().passes(2).build().unwrap();
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "",
        config,
    );
    assert!(reporter.is_complete());
    let second = &reporter.passes()[1];
    assert_eq!(second.missing_counterparts, vec![String::from("2")]);
    assert_eq!(second.scored_profiles, 1);
    // Only "Acme" is known to the model of pass 2; "Rui" is not.
    assert_eq!(second.score, Score::new(1, 1, 0));
}

#[test]
fn malformed_annotation_aborts_the_run_and_keeps_completed_passes() {
    let repository = Tampered {
        inner: InMemoryRepository::new(rows()),
        hidden_from_search: &[],
        broken_from: 3,
    };
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "",
        HarnessConfig::default(),
    );
    assert_eq!(reporter.passes().len(), 2);
    let failure = reporter.failure().unwrap();
    assert_eq!(failure.pass, 3);
    assert_eq!(failure.stage, Stage::Extraction);
    assert!(failure.message.contains("`broken`"));
    assert!(reporter.to_string().ends_with(
        "failed pass 3 during extraction: Profile `broken`: \
         Malformed annotation: found 1 tags but only 0 tagged mentions\n"
    ));
}

#[test]
fn unaligned_gold_mentions_are_counted() {
    // With whitespace tokens, "Lisboa" never appears alone: it is glued to the final period.
    let repository = InMemoryRepository::new(vec![ProfileRow::new(
        "1",
        "Ana mora em Lisboa.",
        Some("<PER>Ana</PER> mora em <LOCAL>Lisboa</LOCAL>."),
        Some(1),
    )]);
    let config = HarnessConfigBuilder::default().passes(1).build().unwrap();
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(WhitespaceTokenizer),
        WhitespaceTokenizer,
        "",
        config,
    );
    let first = &reporter.passes()[0];
    assert_eq!(first.unaligned_entities, 1);
    assert_eq!(first.score, Score::new(0, 1, 0));
}

#[test]
fn base_corpus_is_used_from_the_first_pass() {
    let repository = InMemoryRepository::new(rows());
    let config = HarnessConfigBuilder::default()
        .passes(1)
        .division_by_zero(DivByZeroStrat::ReturnError)
        .build()
        .unwrap();
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "<START:PESSOA> Rui <END> trabalha na <START:ORGANIZACAO> Acme <END> .",
        config,
    );
    // Gold of pass 1: Ana Silva, Acme (profile 1), Acme, Ana Silva (2), Rui, Acme (3).
    assert_eq!(reporter.passes()[0].score, Score::new(4, 2, 0));
    assert_eq!(
        reporter.to_string(),
        "Pass, Wrong, Found, Missing, Total, Precision, Recall, Fscore\n\
         1, 0, 4, 2, 6, 1, 0.6666667, 0.8\n"
    );
}

#[test]
fn json_lines_run_serializes_its_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.jsonl");
    serde_jsonlines::write_json_lines(&path, rows()).unwrap();
    let reporter = run_passes_conf(
        JsonLinesRepository::new(&path),
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "",
        HarnessConfig::from_toml_str("passes = 3").unwrap(),
    );
    assert_eq!(reporter.passes().len(), 3);
    let json = serde_json::to_string(&reporter).unwrap();
    let back: Reporter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, reporter);
}

#[test]
fn multi_line_mention_trains_and_every_pass_completes() {
    let repository = InMemoryRepository::new(vec![
        ProfileRow::new(
            "1",
            "Ana\nSilva mora em Lisboa.",
            Some("<PER>Ana\nSilva</PER> mora em Lisboa."),
            Some(1),
        ),
        ProfileRow::new(
            "2",
            "Ana Silva mora em Lisboa.",
            Some("<PER>Ana Silva</PER> mora em Lisboa."),
            Some(4),
        ),
    ]);
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "",
        HarnessConfig::default(),
    );
    assert!(reporter.is_complete());
    assert_eq!(reporter.passes().len(), 4);
    // From pass 2 on, the name learnt from profile 1 is found in profile 2.
    assert_eq!(reporter.passes()[1].score, Score::new(1, 0, 0));
}

#[test]
fn training_failure_stops_the_run_at_its_pass() {
    let repository = InMemoryRepository::new(rows());
    let reporter = run_passes_conf(
        repository,
        DictionaryTagger::new(SimpleTokenizer),
        SimpleTokenizer,
        "<START:PESSOA> Rui",
        HarnessConfig::default(),
    );
    assert!(reporter.passes().is_empty());
    let failure = reporter.failure().unwrap();
    assert_eq!(failure.pass, 1);
    assert_eq!(failure.stage, Stage::Training);
    assert_eq!(
        failure.message,
        "Malformed training sample at line 1: `<START:PESSOA>` is never closed"
    );
    assert!(reporter.to_string().ends_with(
        "failed pass 1 during training: \
         Malformed training sample at line 1: `<START:PESSOA>` is never closed\n"
    ));
}
