/*!
Assembly of the training corpus handed to the tagger: a fixed base corpus followed by the
manually annotated training documents, rewritten from inline tags to the marker format.
*/
use crate::entity::Category;
use crate::profile::Profile;
use crate::tagger::DOC_START;
use itertools::Itertools;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// A whole tagged mention, or else a lone tag.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^/>][^>]*)>([^<]+)</[^>]+>|<(/?)([^>]+)>").unwrap()
});

/// Rewrites inline tags into standalone marker tokens: `<PER>` becomes ` <START:PESSOA> `,
/// `<LOCAL>` ` <START:LOCAL> `, `<ORG>` ` <START:ORGANIZACAO> `, `<MISC>` and any other opening
/// tag ` <START:ABSTRACCAO> `, and every closing tag ` <END> `.
///
/// The marker format reads one line at a time, so the content of a tagged mention is put on a
/// single line with its whitespace collapsed. A mention with blank content loses its markers,
/// as gold extraction never aligns it.
///
/// ```rust
/// use nerpass::rewrite_markup;
///
/// assert_eq!(
///     rewrite_markup("<PER>Ana</PER> em <MISC>Física</MISC>"),
///     " <START:PESSOA> Ana <END>  em  <START:ABSTRACCAO> Física <END> "
/// );
/// ```
pub fn rewrite_markup(annotation: &str) -> String {
    MARKUP
        .replace_all(annotation, |caps: &Captures| {
            if let Some(content) = caps.get(2) {
                let name = content.as_str().split_whitespace().join(" ");
                if name.is_empty() {
                    return String::from(" ");
                }
                let marker = Category::from_tag(&caps[1]).marker();
                format!(" <START:{}> {} <END> ", marker, name)
            } else if &caps[3] == "/" {
                String::from(" <END> ")
            } else {
                format!(" <START:{}> ", Category::from_tag(&caps[4]).marker())
            }
        })
        .into_owned()
}

/// Builds the training corpus of a pass from a base corpus, which is reused as is.
#[derive(Debug, Clone, Copy)]
pub struct CorpusBuilder<'a> {
    base: &'a str,
}

impl<'a> CorpusBuilder<'a> {
    pub fn new(base: &'a str) -> Self {
        Self { base }
    }

    /// Appends every training profile, in iteration order, after a document separator.
    /// Profiles without a manual annotation carry nothing to learn from and are skipped.
    pub fn build<'p, I>(&self, train: I) -> String
    where
        I: IntoIterator<Item = &'p Profile>,
    {
        let mut corpus = String::from(self.base);
        for profile in train {
            let Some(annotation) = profile.manual_annotation() else {
                tracing::debug!(profile = profile.id(), "no manual annotation, skipped");
                continue;
            };
            corpus.push('\n');
            corpus.push_str(DOC_START);
            corpus.push_str("\n\n");
            corpus.push_str(&rewrite_markup(annotation));
        }
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{parse_samples, Span};
    use crate::tokenizer::SimpleTokenizer;
    use rstest::rstest;

    #[rstest]
    #[case("<PER>", " <START:PESSOA> ")]
    #[case("<LOCAL>", " <START:LOCAL> ")]
    #[case("<LOC>", " <START:LOCAL> ")]
    #[case("<ORG>", " <START:ORGANIZACAO> ")]
    #[case("<MISC>", " <START:ABSTRACCAO> ")]
    #[case("<TEMPO>", " <START:ABSTRACCAO> ")]
    #[case("</PER>", " <END> ")]
    #[case("</ANYTHING>", " <END> ")]
    fn test_rewrite_single_tag(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(rewrite_markup(tag), expected)
    }

    #[rstest]
    #[case("<PER>Ana\nSilva</PER> mora", " <START:PESSOA> Ana Silva <END>  mora")]
    #[case("<ORG>\tAcme \r\n Corp </ORG>", " <START:ORGANIZACAO> Acme Corp <END> ")]
    #[case("<PER> \n </PER> e <PER>Rui</PER>", "  e  <START:PESSOA> Rui <END> ")]
    #[case("<PER>Ana", " <START:PESSOA> Ana")]
    fn test_rewrite_mentions_on_one_line(#[case] annotation: &str, #[case] expected: &str) {
        assert_eq!(rewrite_markup(annotation), expected)
    }

    #[test]
    fn test_multi_line_mention_is_a_valid_sample() {
        let train = [profile("a", Some("<PER>Ana\nSilva</PER> mora em\n<LOCAL>Lisboa</LOCAL>."))];
        let corpus = CorpusBuilder::new("").build(train.iter());
        let samples = parse_samples(&corpus, &SimpleTokenizer).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].names, vec![Span::new(0, 2, "PESSOA")]);
        assert_eq!(samples[1].names, vec![Span::new(0, 1, "LOCAL")]);
    }

    fn profile(id: &str, annotation: Option<&str>) -> Profile {
        Profile::new(id, "", annotation.map(String::from))
    }

    #[test]
    fn test_build() {
        let train = [
            profile("a", Some("<PER>Ana Silva</PER> works at <ORG>Acme</ORG>.")),
            profile("b", None),
            profile("c", Some("<LOCAL>Lisboa</LOCAL>")),
        ];
        let corpus = CorpusBuilder::new("base").build(train.iter());
        assert_eq!(
            corpus,
            "base\n--DOCSTART--\n\n \
             <START:PESSOA> Ana Silva <END>  works at  <START:ORGANIZACAO> Acme <END> .\
             \n--DOCSTART--\n\n <START:LOCAL> Lisboa <END> "
        );
    }

    #[test]
    fn test_build_keeps_iteration_order() {
        let train = [
            profile("z", Some("<PER>Zé</PER>")),
            profile("a", Some("<PER>Ana</PER>")),
        ];
        let corpus = CorpusBuilder::new("").build(train.iter());
        let ze = corpus.find("Zé").unwrap();
        let ana = corpus.find("Ana").unwrap();
        assert!(ze < ana);
    }

    #[test]
    fn test_build_without_training_profiles() {
        let corpus = CorpusBuilder::new("base corpus").build(std::iter::empty());
        assert_eq!(corpus, "base corpus");
    }
}
