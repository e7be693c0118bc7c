use std::sync::OnceLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{ModelConfig, NgramMethod, NgramRange, NgramToken};
use crate::frequency::NgramCounts;

static BRACKETED: OnceLock<Regex> = OnceLock::new();
static NOISE: OnceLock<Regex> = OnceLock::new();

fn bracketed() -> &'static Regex {
    BRACKETED.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"))
}

fn noise() -> &'static Regex {
    NOISE.get_or_init(|| Regex::new(r"[\p{P}\p{S}\p{N}]").expect("valid regex"))
}

/// Normalizes raw text before n-grams are taken.
///
/// Bracketed annotations such as `[1]` are dropped, punctuation, symbols and digits become
/// spaces, the text is lowercased and every run of whitespace (line breaks included) becomes a
/// single space.
///
/// # Examples
///
/// ```
/// use textcat::clean_text;
///
/// assert_eq!("hello world", clean_text("Hello,\nWorld! [1] 42"));
/// ```
pub fn clean_text(text: &str) -> String {
    let text = bracketed().replace_all(text, " ");
    let text = noise().replace_all(&text, " ");
    let text = text.to_lowercase();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits raw text into sentences on Unicode sentence boundaries.
///
/// Line breaks also end a sentence.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.unicode_sentences()
}

/// Counts the `n`-character windows of `word`.
fn count_char_ngrams(word: &str, n: usize, counts: &mut NgramCounts) {
    let bounds: Vec<usize> = word
        .char_indices()
        .map(|(i, _)| i)
        .chain(Some(word.len()))
        .collect();
    // bounds.len() == number of chars + 1
    if bounds.len() <= n {
        return;
    }
    for (st, ed) in bounds.iter().zip(&bounds[n..]) {
        counts.add(&word[*st..*ed]);
    }
}

/// N-gram extractor.
///
/// Extraction is a pure function of the document and the extractor's parameters.
///
/// # Examples
///
/// ```
/// use textcat::{NgramExtractor, NgramMethod, NgramRange, NgramToken};
///
/// let extractor = NgramExtractor::new(
///     NgramRange::single(2).unwrap(),
///     NgramMethod::Normal,
///     NgramToken::Char,
/// );
/// let counts = extractor.extract("ab ab");
/// assert_eq!(2, counts.get("ab"));
/// assert_eq!(1, counts.len());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NgramExtractor {
    ngrams: NgramRange,
    method: NgramMethod,
    token: NgramToken,
}

impl NgramExtractor {
    /// Creates a new extractor.
    ///
    /// # Arguments
    ///
    /// * `ngrams` - The n-gram sizes. Every size of the range is counted.
    /// * `method` - The segmentation method.
    /// * `token` - The n-gram unit.
    ///
    /// # Returns
    ///
    /// A new extractor.
    pub const fn new(ngrams: NgramRange, method: NgramMethod, token: NgramToken) -> Self {
        Self {
            ngrams,
            method,
            token,
        }
    }

    /// Creates the extractor a model was trained with.
    pub const fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.ngrams(),
            config.ngram_method(),
            config.ngram_token(),
        )
    }

    /// Counts the n-grams of a document.
    ///
    /// # Arguments
    ///
    /// * `document` - A raw document.
    ///
    /// # Returns
    ///
    /// N-gram counts in first-seen order. Empty if the document has no n-gram.
    pub fn extract(&self, document: &str) -> NgramCounts {
        let mut counts = NgramCounts::new();
        self.extract_into(document, &mut counts);
        counts
    }

    /// Adds the n-grams of a document to existing counts.
    pub fn extract_into(&self, document: &str, counts: &mut NgramCounts) {
        match self.method {
            NgramMethod::Normal => self.count_segment(&clean_text(document), counts),
            NgramMethod::Sentence => {
                for sentence in split_sentences(document) {
                    self.count_segment(&clean_text(sentence), counts);
                }
            }
        }
    }

    fn count_segment(&self, text: &str, counts: &mut NgramCounts) {
        let words: Vec<&str> = text.split_whitespace().collect();
        for n in self.ngrams.iter() {
            match self.token {
                NgramToken::Word => {
                    for window in words.windows(n) {
                        counts.add(&window.join(" "));
                    }
                }
                NgramToken::Char => {
                    for word in &words {
                        count_char_ngrams(word, n, counts);
                    }
                }
                NgramToken::CharWb => {
                    for word in &words {
                        count_char_ngrams(&format!(" {word} "), n, counts);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(start: usize, end: usize, method: NgramMethod, token: NgramToken) -> NgramExtractor {
        NgramExtractor::new(NgramRange::new(start, end).unwrap(), method, token)
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            "the cat sat on the mat",
            clean_text("The cat (3) sat.\n\nOn the MAT!")
        );
        assert_eq!("see also", clean_text("See also[12]:"));
        assert_eq!("don t", clean_text("Don't"));
        assert_eq!("", clean_text("1984 -- 2024?"));
    }

    #[test]
    fn test_clean_text_non_ascii() {
        assert_eq!("ça va grüße", clean_text("Ça VA, Grüße!"));
        assert_eq!("日本語 テキスト", clean_text("日本語。テキスト！"));
    }

    #[test]
    fn test_char_bigrams() {
        let counts = extractor(2, 2, NgramMethod::Normal, NgramToken::Char).extract("ab ab");

        assert_eq!(vec![("ab", 2)], counts.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_char_ngrams_do_not_span_words() {
        let counts = extractor(2, 2, NgramMethod::Normal, NgramToken::Char).extract("abc de");

        assert_eq!(
            vec![("ab", 1), ("bc", 1), ("de", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_char_ngrams_short_word() {
        let counts = extractor(3, 3, NgramMethod::Normal, NgramToken::Char).extract("a ab abc");

        assert_eq!(vec![("abc", 1)], counts.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_char_ngrams_multibyte() {
        let counts = extractor(2, 2, NgramMethod::Normal, NgramToken::Char).extract("日本語");

        assert_eq!(
            vec![("日本", 1), ("本語", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_char_wb_ngrams() {
        let counts = extractor(2, 2, NgramMethod::Normal, NgramToken::CharWb).extract("ab a");

        assert_eq!(
            vec![(" a", 2), ("ab", 1), ("b ", 1), ("a ", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_char_wb_short_word() {
        let counts = extractor(4, 4, NgramMethod::Normal, NgramToken::CharWb).extract("a ab");

        assert_eq!(vec![(" ab ", 1)], counts.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_word_ngrams() {
        let counts = extractor(1, 1, NgramMethod::Normal, NgramToken::Word).extract("the cat sat");

        assert_eq!(
            vec![("the", 1), ("cat", 1), ("sat", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_word_bigrams_overlap() {
        let counts =
            extractor(2, 2, NgramMethod::Normal, NgramToken::Word).extract("a b a b");

        assert_eq!(
            vec![("a b", 2), ("b a", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_word_ngrams_too_few_words() {
        let counts = extractor(3, 3, NgramMethod::Normal, NgramToken::Word).extract("two words");

        assert!(counts.is_empty());
    }

    #[test]
    fn test_sentence_boundaries() {
        let text = "The cat sat. The dog ran.";
        let normal = extractor(2, 2, NgramMethod::Normal, NgramToken::Word).extract(text);
        let sentence = extractor(2, 2, NgramMethod::Sentence, NgramToken::Word).extract(text);

        assert_eq!(1, normal.get("sat the"));
        assert_eq!(0, sentence.get("sat the"));
        assert_eq!(
            vec![("the cat", 1), ("cat sat", 1), ("the dog", 1), ("dog ran", 1)],
            sentence.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_sentence_line_breaks() {
        let counts =
            extractor(2, 2, NgramMethod::Sentence, NgramToken::Word).extract("red fox\nblue sky");

        assert_eq!(0, counts.get("fox blue"));
        assert_eq!(1, counts.get("red fox"));
        assert_eq!(1, counts.get("blue sky"));
    }

    #[test]
    fn test_sentence_char_units() {
        for text in ["Ab cd. Ef gh.", "Ab cd.\nEf gh! Ij?"] {
            for token in [NgramToken::Char, NgramToken::CharWb] {
                let normal = extractor(1, 3, NgramMethod::Normal, token).extract(text);
                let sentence = extractor(1, 3, NgramMethod::Sentence, token).extract(text);

                assert!(!sentence.is_empty());
                assert_eq!(normal, sentence);
            }
        }
    }

    #[test]
    fn test_ngram_range() {
        let counts = extractor(1, 2, NgramMethod::Normal, NgramToken::Char).extract("abc");

        assert_eq!(
            vec![("a", 1), ("b", 1), ("c", 1), ("ab", 1), ("bc", 1)],
            counts.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_document() {
        let e = extractor(2, 2, NgramMethod::Sentence, NgramToken::CharWb);

        assert!(e.extract("").is_empty());
        assert!(e.extract("123 !!! ...").is_empty());
    }

    #[test]
    fn test_extract_deterministic() {
        let text = "Lorem ipsum dolor sit amet. Consectetur adipiscing elit, sed do.";
        for method in [NgramMethod::Normal, NgramMethod::Sentence] {
            for token in [NgramToken::Word, NgramToken::Char, NgramToken::CharWb] {
                let e = extractor(1, 3, method, token);
                assert_eq!(e.extract(text), e.extract(text));
            }
        }
    }
}
