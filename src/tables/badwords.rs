//! Bad-word list.
//!
//! `badwords.json` is a flat array of strings. Words are normalized to
//! lowercase at load time; matching is case-insensitive substring
//! containment in list order.

use std::path::Path;

use tracing::warn;

use super::load_json;

/// Immutable set of lowercase bad words.
#[derive(Debug, Clone, Default)]
pub struct BadWordSet {
    words: Vec<String>,
}

impl BadWordSet {
    /// Load the list, degrading to an empty set on any error.
    pub fn load(path: &Path) -> Self {
        match load_json::<Vec<String>>(path) {
            Ok(words) => Self::from_words(words),
            Err(e) => {
                warn!("bad-word list unavailable, filter disabled: {e}");
                Self::default()
            }
        }
    }

    pub fn from_words(words: Vec<String>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.words.iter()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
