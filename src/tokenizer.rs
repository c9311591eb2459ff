/*!
Tokenizers split a text into an ordered sequence of tokens. The harness only relies on the
[`Tokenizer`] trait: the same tokenizer must be used to reconstruct the gold spans and to feed
the tagger, otherwise token offsets do not line up.
*/
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// A deterministic tokenizer. The returned tokens borrow from the input text.
pub trait Tokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for &T {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        (**self).tokenize(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Alphanumeric,
    Other,
}

impl From<char> for CharClass {
    fn from(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Whitespace
        } else if c.is_alphanumeric() {
            CharClass::Alphanumeric
        } else {
            CharClass::Other
        }
    }
}

/// Character-class tokenizer. A run of alphanumeric characters is a single token, whitespace
/// only separates tokens and every other character (punctuation, symbols) is a token on its own.
///
/// ```rust
/// use nerpass::{SimpleTokenizer, Tokenizer};
///
/// let tokens = SimpleTokenizer.tokenize("Possui graduação em Física (2004), pela UFSC.");
/// assert_eq!(
///     tokens,
///     vec!["Possui", "graduação", "em", "Física", "(", "2004", ")", ",", "pela", "UFSC", "."]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut run_start: Option<usize> = None;
        for (index, c) in text.char_indices() {
            match CharClass::from(c) {
                CharClass::Alphanumeric => {
                    if run_start.is_none() {
                        run_start = Some(index);
                    }
                }
                class => {
                    if let Some(start) = run_start.take() {
                        tokens.push(&text[start..index]);
                    }
                    if class == CharClass::Other {
                        tokens.push(&text[index..index + c.len_utf8()]);
                    }
                }
            }
        }
        if let Some(start) = run_start {
            tokens.push(&text[start..]);
        }
        tokens
    }
}

/// Splits on whitespace only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace().collect()
    }
}

/// Tokenizers that can be selected by name, e.g. from the command line or a configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Simple,
    Whitespace,
}

impl Tokenizer for TokenizerKind {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Self::Simple => SimpleTokenizer.tokenize(text),
            Self::Whitespace => WhitespaceTokenizer.tokenize(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tokenizer `{0}`. Expected `simple` or `whitespace`")]
pub struct UnknownTokenizer(String);

impl FromStr for TokenizerKind {
    type Err = UnknownTokenizer;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "whitespace" => Ok(Self::Whitespace),
            _ => Err(UnknownTokenizer(String::from(s))),
        }
    }
}

impl Display for TokenizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Whitespace => write!(f, "whitespace"),
        }
    }
}
