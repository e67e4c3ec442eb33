//! Text content filter.
//!
//! Pure classification over lowercased text: bad-word substring search
//! and URL detection. The pipeline decides what to do with a match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tables::BadWordSet;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url pattern is valid"));

pub struct ContentFilter {
    bad_words: BadWordSet,
}

impl ContentFilter {
    pub fn new(bad_words: BadWordSet) -> Self {
        Self { bad_words }
    }

    /// First configured bad word contained in the text, in list order.
    pub fn find_bad_word(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.bad_words
            .iter()
            .find(|word| lowered.contains(word.as_str()))
            .map(String::as_str)
    }

    /// Whether the text carries an http(s) link.
    pub fn contains_url(&self, text: &str) -> bool {
        URL_RE.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ContentFilter {
        ContentFilter::new(BadWordSet::from_words(vec![
            "scam".into(),
            "casino".into(),
        ]))
    }

    #[test]
    fn bad_words_match_case_insensitively_inside_words() {
        let f = filter();
        assert_eq!(f.find_bad_word("total SCAMMER alert"), Some("scam"));
        assert_eq!(f.find_bad_word("clean message"), None);
    }

    #[test]
    fn first_listed_word_wins() {
        let f = filter();
        assert_eq!(f.find_bad_word("casino scam casino"), Some("scam"));
    }

    #[test]
    fn urls_are_detected() {
        let f = filter();
        assert!(f.contains_url("see https://example.com/page now"));
        assert!(f.contains_url("http://t.me/spam"));
        assert!(!f.contains_url("just example.com without scheme"));
        assert!(!f.contains_url("ftp://old.example.com"));
    }

    #[test]
    fn classification_has_no_side_effects() {
        let f = filter();
        // Same input, same answer, any number of times.
        for _ in 0..3 {
            assert_eq!(f.find_bad_word("casino night"), Some("casino"));
            assert!(f.contains_url("https://a.example"));
        }
    }
}
