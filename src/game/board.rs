//! Word list shared by the word-elimination modes
//!
//! Holds the words on screen, answers prefix queries for highlighting and
//! accuracy credit, and marks words completed on an exact match.

use std::time::Instant;

/// A target word on the board.
///
/// Completed words stay on the board (for the fade-out animation) until the
/// next mode start replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub completed: bool,
    pub completed_at: Option<Instant>,
}

impl Word {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
            completed_at: None,
        }
    }

    /// Whether this uncompleted word starts with `prefix`
    fn is_open_match(&self, prefix: &str) -> bool {
        !self.completed && self.text.starts_with(prefix)
    }
}

/// Ordered list of words for one session
#[derive(Debug, Clone, Default)]
pub struct WordBoard {
    words: Vec<Word>,
}

impl WordBoard {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// All words, completed ones included
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Append freshly drawn words at the end
    pub fn extend(&mut self, words: Vec<Word>) {
        self.words.extend(words);
    }

    /// Texts of the words still to be typed
    pub fn active_words(&self) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| !w.completed)
            .map(|w| w.text.as_str())
            .collect()
    }

    /// Number of words still to be typed
    pub fn remaining(&self) -> usize {
        self.words.iter().filter(|w| !w.completed).count()
    }

    pub fn is_all_completed(&self) -> bool {
        self.words.iter().all(|w| w.completed)
    }

    /// Whether any uncompleted word starts with `input`.
    /// An empty input never matches.
    pub fn has_prefix_match(&self, input: &str) -> bool {
        !input.is_empty() && self.words.iter().any(|w| w.is_open_match(input))
    }

    /// Indices of uncompleted words starting with `input`
    pub fn matched_indices(&self, input: &str) -> Vec<usize> {
        if input.is_empty() {
            return Vec::new();
        }
        self.words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_open_match(input))
            .map(|(i, _)| i)
            .collect()
    }

    /// Mark the first uncompleted word equal to `input` as completed.
    ///
    /// Returns the length of the eliminated word.
    pub fn eliminate(&mut self, input: &str, now: Instant) -> Option<usize> {
        if input.is_empty() {
            return None;
        }
        let word = self
            .words
            .iter_mut()
            .find(|w| !w.completed && w.text == input)?;
        word.completed = true;
        word.completed_at = Some(now);
        Some(word.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(texts: &[&str]) -> WordBoard {
        WordBoard::new(texts.iter().map(|t| Word::new(*t)).collect())
    }

    #[test]
    fn test_prefix_match_ignores_completed() {
        let now = Instant::now();
        let mut b = board(&["cat", "car", "dog"]);
        assert!(b.has_prefix_match("ca"));
        assert_eq!(b.matched_indices("ca"), vec![0, 1]);

        b.eliminate("cat", now);
        assert_eq!(b.matched_indices("ca"), vec![1]);
        assert!(!b.has_prefix_match("cat"));
    }

    #[test]
    fn test_empty_input_never_matches() {
        let b = board(&["cat"]);
        assert!(!b.has_prefix_match(""));
        assert!(b.matched_indices("").is_empty());
    }

    #[test]
    fn test_eliminate_exact_only() {
        let now = Instant::now();
        let mut b = board(&["cat", "cats"]);
        assert_eq!(b.eliminate("ca", now), None);
        assert_eq!(b.eliminate("cats", now), Some(4));
        assert!(b.words()[1].completed);
        assert_eq!(b.words()[1].completed_at, Some(now));
        assert!(!b.words()[0].completed);
    }

    #[test]
    fn test_duplicate_texts_eliminated_one_at_a_time() {
        let now = Instant::now();
        let mut b = board(&["go", "go"]);
        assert_eq!(b.eliminate("go", now), Some(2));
        assert_eq!(b.remaining(), 1);
        assert_eq!(b.eliminate("go", now), Some(2));
        assert!(b.is_all_completed());
        assert_eq!(b.eliminate("go", now), None);
    }

    #[test]
    fn test_active_words_and_extend() {
        let now = Instant::now();
        let mut b = board(&["a", "b"]);
        b.eliminate("a", now);
        b.extend(vec![Word::new("c")]);
        assert_eq!(b.active_words(), vec!["b", "c"]);
        assert_eq!(b.words().len(), 3);
    }
}
