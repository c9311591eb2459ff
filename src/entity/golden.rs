/*!
Reconstruction of the gold entities of a manually annotated document.

Annotations are inline tags such as `<PER>Ana Silva</PER>`. The tags are stripped, the clean
text is tokenized and every tagged mention is located, in textual order, in the resulting token
sequence. The offsets of a gold entity are therefore token offsets into the tag-stripped text.
*/
use crate::entity::{Category, Entity, EntitySet};
use crate::tokenizer::Tokenizer;
use regex::Regex;
use std::sync::LazyLock;

/// `<TAG>content</ANY>`. The closing tag is not required to match the opening one.
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^/>][^>]*)>([^<]+)</[^>]+>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Removes every tag from the text, keeping the content between them.
pub fn strip_tags(text: &str) -> String {
    ANY_TAG.replace_all(text, "").into_owned()
}

/// Inserts a space after every comma. Applied to both the document and the mentions so that
/// they are tokenized the same way.
pub fn normalize_commas(text: &str) -> String {
    text.replace(',', ", ")
}

/// The markup of an annotation could not be read as a flat sequence of `<TAG>..</TAG>` pairs.
/// This happens with unbalanced, nested or empty tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed annotation: found {tags} tags but only {mentions} tagged mentions")]
pub struct MalformedAnnotation {
    pub tags: usize,
    pub mentions: usize,
}

/// A tagged mention whose tokens do not appear in the document at or after the cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not align `{text}` at or after token {cursor} of {doc_len}")]
pub struct AlignmentFailure {
    pub text: String,
    pub category: Category,
    pub cursor: usize,
    pub doc_len: usize,
}

/// Result of a gold span reconstruction. Mentions that could not be aligned are reported in
/// `unaligned` and left out of `entities`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldSpans {
    pub entities: Vec<Entity>,
    pub unaligned: Vec<AlignmentFailure>,
}

impl GoldSpans {
    pub fn into_set(self) -> EntitySet {
        self.entities.into_iter().collect()
    }
}

/// Provisional entity: category and surface text are known, offsets are not.
struct Mention<'a> {
    category: Category,
    text: &'a str,
}

fn mentions(text: &str) -> Vec<Mention<'_>> {
    MENTION
        .captures_iter(text)
        .filter_map(|caps| {
            let tag = caps.get(1)?;
            let content = caps.get(2)?;
            Some(Mention {
                category: Category::from_tag(tag.as_str()),
                text: content.as_str(),
            })
        })
        .collect()
}

/// Returns the start of the first window of `doc` equal to `needle` beginning at or after
/// `cursor`. The scan stops at the end of `doc`.
fn find_window(doc: &[&str], needle: &[&str], cursor: usize) -> Option<usize> {
    if needle.is_empty() || cursor >= doc.len() {
        return None;
    }
    doc[cursor..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| cursor + offset)
}

/// Converts inline-tagged text into token aligned gold entities.
///
/// ```rust
/// use nerpass::{Category, GoldenSpanExtractor, SimpleTokenizer};
///
/// let extractor = GoldenSpanExtractor::new(SimpleTokenizer);
/// let spans = extractor
///     .extract("<PER>Ana Silva</PER> works at <ORG>Acme</ORG>.")
///     .unwrap();
/// let offsets: Vec<_> = spans.entities.iter().map(|e| (e.start(), e.end())).collect();
/// assert_eq!(offsets, vec![(0, 2), (4, 5)]);
/// assert_eq!(spans.entities[1].category(), Category::Organization);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GoldenSpanExtractor<K> {
    tokenizer: K,
}

impl<K: Tokenizer> GoldenSpanExtractor<K> {
    pub fn new(tokenizer: K) -> Self {
        Self { tokenizer }
    }

    /// Extracts the gold entities of `marked_up`. Mentions are resolved left to right with a
    /// cursor that only moves forward, so repeated mentions of the same words resolve to
    /// successive windows.
    pub fn extract(&self, marked_up: &str) -> Result<GoldSpans, MalformedAnnotation> {
        let mentions = mentions(marked_up);
        let tags = ANY_TAG.find_iter(marked_up).count();
        if tags != 2 * mentions.len() {
            return Err(MalformedAnnotation {
                tags,
                mentions: mentions.len(),
            });
        }

        let clean_text = normalize_commas(&strip_tags(marked_up));
        let doc_tokens = self.tokenizer.tokenize(&clean_text);

        let mut spans = GoldSpans::default();
        let mut cursor = 0;
        for mention in mentions {
            let content = normalize_commas(mention.text);
            let entity_tokens = self.tokenizer.tokenize(&content);
            match find_window(&doc_tokens, &entity_tokens, cursor) {
                Some(start) => {
                    let end = start + entity_tokens.len();
                    spans
                        .entities
                        .push(Entity::new(mention.text, start, end, mention.category));
                    cursor = end;
                }
                None => {
                    tracing::debug!(mention = mention.text, cursor, "mention not aligned");
                    spans.unaligned.push(AlignmentFailure {
                        text: String::from(mention.text),
                        category: mention.category,
                        cursor,
                        doc_len: doc_tokens.len(),
                    });
                }
            }
        }
        Ok(spans)
    }

    /// Tokens of the tag-stripped, comma-normalized text. Gold offsets index into this sequence.
    pub fn clean_tokens(&self, marked_up: &str) -> Vec<String> {
        let clean_text = normalize_commas(&strip_tags(marked_up));
        self.tokenizer
            .tokenize(&clean_text)
            .into_iter()
            .map(String::from)
            .collect()
    }
}
