//! Built-in word lists and sentences
//!
//! Embedded at build time and used whenever the configuration does not name
//! an external dictionary, so the game runs without any data files.

use super::words::{load_sentences, load_words, Tier};
use once_cell::sync::Lazy;
use std::io::Cursor;

static SHORT_DATA: &str = include_str!("../../data/short.txt");
static MEDIUM_DATA: &str = include_str!("../../data/medium.txt");
static LONG_DATA: &str = include_str!("../../data/long.txt");
static SENTENCE_DATA: &str = include_str!("../../data/sentences.txt");

/// Parsed once, on first use
static SHORT: Lazy<Vec<String>> = Lazy::new(|| parse_words(SHORT_DATA));
static MEDIUM: Lazy<Vec<String>> = Lazy::new(|| parse_words(MEDIUM_DATA));
static LONG: Lazy<Vec<String>> = Lazy::new(|| parse_words(LONG_DATA));
static SENTENCES: Lazy<Vec<String>> =
    Lazy::new(|| load_sentences(Cursor::new(SENTENCE_DATA)).unwrap_or_default());

fn parse_words(data: &str) -> Vec<String> {
    load_words(Cursor::new(data)).unwrap_or_default()
}

/// Built-in words for one tier
pub fn builtin_words(tier: Tier) -> Vec<String> {
    match tier {
        Tier::Short => SHORT.clone(),
        Tier::Medium => MEDIUM.clone(),
        Tier::Long => LONG.clone(),
    }
}

/// Built-in sentences for sentence mode
pub fn builtin_sentences() -> Vec<String> {
    SENTENCES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::words::is_valid_word;

    #[test]
    fn test_builtin_tiers_not_empty() {
        for tier in Tier::all() {
            let words = builtin_words(tier);
            assert!(words.len() > 50, "{} tier has {} words", tier.label(), words.len());
        }
    }

    #[test]
    fn test_builtin_words_are_lowercase_letters() {
        for tier in Tier::all() {
            for word in builtin_words(tier) {
                assert!(is_valid_word(&word), "invalid word {:?}", word);
                assert_eq!(word, word.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn test_builtin_sentences_skip_comments() {
        let sentences = builtin_sentences();
        assert!(!sentences.is_empty());
        assert!(sentences.iter().all(|s| !s.starts_with('#') && !s.is_empty()));
    }
}
