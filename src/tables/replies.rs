//! Keyword auto-reply table.
//!
//! `replies.json` is an object mapping trigger patterns to reply
//! candidate lists:
//!
//! ```json
//! {
//!     "hi|hello": ["Hi {name}!", "Hello there!"],
//!     "good morning": ["Morning! ☀️"]
//! }
//! ```
//!
//! A key containing `|` expands to multiple literal alternatives, each
//! lowercased and trimmed. Matching iterates patterns in table
//! (insertion) order and the first matching pattern wins, so earlier
//! generic patterns shadow later specific ones. That ordering is part
//! of the observable behavior and is deliberately preserved.

use std::path::Path;

use serde_json::Value;
use tracing::warn;

use super::load_json;

/// One trigger pattern with its reply candidates.
#[derive(Debug, Clone)]
pub struct ReplyPattern {
    alternatives: Vec<String>,
    responses: Vec<String>,
}

impl ReplyPattern {
    fn new(key: &str, responses: Vec<String>) -> Self {
        let alternatives = key
            .split('|')
            .map(|alt| alt.trim().to_lowercase())
            .filter(|alt| !alt.is_empty())
            .collect();
        Self { alternatives, responses }
    }

    /// A lowercased message matches if it equals an alternative or
    /// contains it as a substring.
    fn matches(&self, lowered: &str) -> bool {
        self.alternatives
            .iter()
            .any(|alt| lowered == alt || lowered.contains(alt.as_str()))
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }
}

/// Ordered reply-pattern table.
#[derive(Debug, Clone, Default)]
pub struct ReplyTable {
    patterns: Vec<ReplyPattern>,
}

impl ReplyTable {
    /// Load the table, degrading to an empty table on any error.
    pub fn load(path: &Path) -> Self {
        match load_json::<serde_json::Map<String, Value>>(path) {
            Ok(map) => Self::from_object(map),
            Err(e) => {
                warn!("reply table unavailable, auto-replies disabled: {e}");
                Self::default()
            }
        }
    }

    fn from_object(map: serde_json::Map<String, Value>) -> Self {
        let patterns = map
            .into_iter()
            .filter_map(|(key, value)| {
                let responses: Vec<String> = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                    Value::String(s) => vec![s],
                    other => {
                        warn!("reply entry '{key}' has unsupported shape, skipping: {other}");
                        return None;
                    }
                };
                if responses.is_empty() {
                    return None;
                }
                Some(ReplyPattern::new(&key, responses))
            })
            .filter(|p| !p.alternatives.is_empty())
            .collect();

        Self { patterns }
    }

    /// Build a table from ordered entries. Used by tests and reloads.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        Self {
            patterns: entries
                .into_iter()
                .map(|(key, responses)| ReplyPattern::new(key.as_ref(), responses))
                .filter(|p| !p.alternatives.is_empty() && !p.responses.is_empty())
                .collect(),
        }
    }

    /// First pattern matching the message, in table order.
    pub fn find(&self, text: &str) -> Option<&ReplyPattern> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        self.patterns.iter().find(|p| p.matches(&lowered))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReplyTable {
        ReplyTable::from_entries([
            ("hi|hello", vec!["Hi {name}!".to_string()]),
            ("good morning", vec!["Morning! ☀️".to_string()]),
            ("morning", vec!["shadowed".to_string()]),
        ])
    }

    #[test]
    fn test_alternatives_match_by_containment() {
        let t = table();
        let p = t.find("hello there").expect("should match");
        assert_eq!(p.responses(), ["Hi {name}!"]);
    }

    #[test]
    fn test_exact_match() {
        let t = table();
        assert!(t.find("hi").is_some());
        assert!(t.find("  HI  ").is_some());
    }

    #[test]
    fn test_no_match() {
        let t = table();
        assert!(t.find("goodbye").is_none());
        assert!(t.find("").is_none());
    }

    #[test]
    fn ambiguous_overlapping_patterns_resolve_in_table_order() {
        // "good morning" contains the later pattern "morning" too; the
        // earlier table entry must win. First-match-wins over table
        // order is intentional, not longest-match.
        let t = table();
        let p = t.find("good morning all").expect("should match");
        assert_eq!(p.responses(), ["Morning! ☀️"]);

        // A message hitting only the later pattern still reaches it.
        let p = t.find("this morning").expect("should match");
        assert_eq!(p.responses(), ["shadowed"]);
    }

    #[test]
    fn test_entries_without_responses_are_dropped() {
        // A pattern with no candidates must never match: the caller
        // indexes into the candidate list.
        let t = ReplyTable::from_entries([
            ("hi", vec![]),
            ("bye", vec!["Bye!".to_string()]),
        ]);
        assert_eq!(t.len(), 1);
        assert!(t.find("hi").is_none());
        assert!(t.find("bye").is_some());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{"hi": ["Hello!"], "bad": 42, "empty": [], "solo": "One reply"}"#,
        )
        .unwrap();
        let t = ReplyTable::from_object(raw);
        assert_eq!(t.len(), 2);
        assert!(t.find("solo").is_some());
    }
}
