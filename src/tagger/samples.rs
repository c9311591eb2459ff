use crate::tagger::{Span, TrainingError};
use crate::tokenizer::Tokenizer;
use regex::Regex;
use std::sync::LazyLock;

/// Line separating two documents of a training corpus.
pub const DOC_START: &str = "--DOCSTART--";

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<START:([^>\s]+)>|<END>").unwrap());

/// One line of a training corpus: its tokens and the names annotated on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSample {
    pub tokens: Vec<String>,
    pub names: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("`<START:{0}>` opened inside another name")]
    NestedStart(String),
    #[error("`<END>` without a matching `<START>`")]
    UnmatchedEnd,
    #[error("`<START:{0}>` is never closed")]
    UnclosedStart(String),
    #[error("name `{0}` has no tokens")]
    EmptyName(String),
}

/// Parses a marker-format corpus into samples. Blank lines and document separators are
/// skipped. Line numbers in errors start at 1.
pub fn parse_samples<K: Tokenizer>(
    corpus: &str,
    tokenizer: &K,
) -> Result<Vec<NameSample>, TrainingError> {
    let mut samples = Vec::new();
    for (index, line) in corpus.lines().enumerate() {
        if line.trim() == DOC_START {
            continue;
        }
        match parse_line(line, tokenizer) {
            Ok(Some(sample)) => samples.push(sample),
            Ok(None) => continue,
            Err(reason) => {
                return Err(TrainingError::MalformedSample {
                    line: index + 1,
                    reason,
                })
            }
        }
    }
    Ok(samples)
}

fn parse_line<K: Tokenizer>(
    line: &str,
    tokenizer: &K,
) -> Result<Option<NameSample>, SampleError> {
    let mut tokens: Vec<String> = Vec::new();
    let mut names = Vec::new();
    let mut open: Option<(String, usize)> = None;
    let mut last = 0;
    for caps in MARKER.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        tokens.extend(
            tokenizer
                .tokenize(&line[last..whole.start()])
                .into_iter()
                .map(String::from),
        );
        last = whole.end();
        match (caps.get(1), open.take()) {
            (Some(label), None) => open = Some((String::from(label.as_str()), tokens.len())),
            (Some(label), Some(_)) => {
                return Err(SampleError::NestedStart(String::from(label.as_str())))
            }
            (None, None) => return Err(SampleError::UnmatchedEnd),
            (None, Some((label, start))) => {
                if start == tokens.len() {
                    return Err(SampleError::EmptyName(label));
                }
                names.push(Span::new(start, tokens.len(), label));
            }
        }
    }
    if let Some((label, _)) = open {
        return Err(SampleError::UnclosedStart(label));
    }
    tokens.extend(
        tokenizer
            .tokenize(&line[last..])
            .into_iter()
            .map(String::from),
    );
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(NameSample { tokens, names }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::SimpleTokenizer;
    use rstest::rstest;

    #[test]
    fn test_parse_samples() {
        let corpus = "\n--DOCSTART--\n\n \
            <START:PESSOA> Ana Silva <END>  works at  <START:ORGANIZACAO> Acme <END> .\n";
        let samples = parse_samples(corpus, &SimpleTokenizer).unwrap();
        assert_eq!(
            samples,
            vec![NameSample {
                tokens: ["Ana", "Silva", "works", "at", "Acme", "."]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                names: vec![Span::new(0, 2, "PESSOA"), Span::new(4, 5, "ORGANIZACAO")],
            }]
        )
    }

    #[test]
    fn test_markers_glued_to_words() {
        let samples =
            parse_samples("pela <START:ORGANIZACAO>UFSC<END>, em 2004", &SimpleTokenizer).unwrap();
        assert_eq!(samples[0].names, vec![Span::new(1, 2, "ORGANIZACAO")]);
        assert_eq!(samples[0].tokens.len(), 5);
    }

    #[test]
    fn test_line_without_names() {
        let samples = parse_samples("Possui graduação.", &SimpleTokenizer).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].names.is_empty());
    }

    #[rstest]
    #[case(
        "<START:PESSOA> Ana <START:LOCAL> Lisboa <END>",
        SampleError::NestedStart(String::from("LOCAL"))
    )]
    #[case("Ana <END>", SampleError::UnmatchedEnd)]
    #[case("<START:PESSOA> Ana", SampleError::UnclosedStart(String::from("PESSOA")))]
    #[case("<START:PESSOA> <END> Ana", SampleError::EmptyName(String::from("PESSOA")))]
    fn test_malformed_samples(#[case] line: &str, #[case] expected: SampleError) {
        let corpus = format!("ok\n{}", line);
        let res = parse_samples(&corpus, &SimpleTokenizer);
        assert_eq!(
            res,
            Err(TrainingError::MalformedSample {
                line: 2,
                reason: expected
            })
        )
    }
}
