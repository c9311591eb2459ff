use crate::tagger::{parse_samples, NameFinder, Span, Tagger, TrainingError, TrainingOptions};
use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Option giving the minimum number of occurrences of a name in the corpus for it to be kept.
pub const CUTOFF_OPTION: &str = "cutoff";

/// Reference tagger memorizing every annotated name of its training corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryTagger<K> {
    tokenizer: K,
}

impl<K: Tokenizer> DictionaryTagger<K> {
    pub fn new(tokenizer: K) -> Self {
        Self { tokenizer }
    }
}

impl<K: Tokenizer> Tagger for DictionaryTagger<K> {
    type Model = DictionaryModel;

    fn train(
        &self,
        label: &str,
        corpus: &str,
        options: &TrainingOptions,
    ) -> Result<DictionaryModel, TrainingError> {
        let cutoff = match options.get(CUTOFF_OPTION) {
            Some(value) => value.parse::<usize>().map_err(|_| TrainingError::InvalidOption {
                key: String::from(CUTOFF_OPTION),
                value: value.clone(),
            })?,
            None => 1,
        };
        let samples = parse_samples(corpus, &self.tokenizer)?;

        // name tokens -> label -> occurrences
        let mut counts: AHashMap<Vec<String>, BTreeMap<String, usize>> = AHashMap::default();
        for sample in samples.iter() {
            for name in sample.names.iter() {
                let key = sample.tokens[name.start..name.end].to_vec();
                *counts
                    .entry(key)
                    .or_default()
                    .entry(name.label.clone())
                    .or_insert(0) += 1;
            }
        }

        let mut entries = AHashMap::with_capacity(counts.len());
        let mut max_len = 0;
        for (key, labels) in counts {
            let total: usize = labels.values().sum();
            if total < cutoff {
                continue;
            }
            // Most frequent label, the smallest one on ties.
            let best = labels
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
            if let Some((best_label, _)) = best {
                max_len = max_len.max(key.len());
                entries.insert(key, best_label);
            }
        }
        tracing::debug!(
            model = label,
            samples = samples.len(),
            names = entries.len(),
            "dictionary model trained"
        );
        Ok(DictionaryModel {
            label: String::from(label),
            entries,
            max_len,
        })
    }
}

/// Names memorized by a [`DictionaryTagger`], matched greedily (longest name first) from left
/// to right. Returned spans never overlap.
#[derive(Debug, Clone, Default)]
pub struct DictionaryModel {
    label: String,
    entries: AHashMap<Vec<String>, String>,
    max_len: usize,
}

impl DictionaryModel {
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameFinder for DictionaryModel {
    fn find(&self, tokens: &[&str]) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;
        while start < tokens.len() {
            let longest = self.max_len.min(tokens.len() - start);
            let found = (1..=longest).rev().find_map(|n| {
                let key: Vec<String> = tokens[start..start + n]
                    .iter()
                    .map(|token| String::from(*token))
                    .collect();
                self.entries.get(&key).map(|label| (n, label))
            });
            match found {
                Some((n, label)) => {
                    spans.push(Span::new(start, start + n, label.as_str()));
                    start += n;
                }
                None => start += 1,
            }
        }
        spans
    }
}
