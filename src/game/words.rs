//! Difficulty-tiered word pools
//!
//! Loads short/medium/long dictionaries, draws words without replacement
//! according to the tier ratios and remembers every drawn word until the next
//! session resets usage.

use super::board::Word;
use super::GameError;
use rand::prelude::*;
use std::collections::HashSet;
use std::io::BufRead;

/// Word count used when a draw asks for zero words
pub const DEFAULT_WORD_COUNT: usize = 20;

/// Errors that can occur while loading a dictionary.
#[derive(Debug)]
pub enum LoadError {
    /// No valid word survived filtering
    EmptyDictionary,
    /// The source could not be read
    Io(std::io::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::EmptyDictionary => write!(f, "dictionary is empty"),
            LoadError::Io(e) => write!(f, "failed to read dictionary: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

/// Difficulty bucket of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Short,
    Medium,
    Long,
}

impl Tier {
    pub fn all() -> [Tier; 3] {
        [Tier::Short, Tier::Medium, Tier::Long]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Short => "short",
            Tier::Medium => "medium",
            Tier::Long => "long",
        }
    }

    fn index(&self) -> usize {
        match self {
            Tier::Short => 0,
            Tier::Medium => 1,
            Tier::Long => 2,
        }
    }
}

/// Normalized share of each tier in a draw (sums to 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRatios {
    pub short: f64,
    pub medium: f64,
    pub long: f64,
}

impl TierRatios {
    /// Normalize raw weights so they sum to one.
    ///
    /// Returns `None` if any weight is negative or all are zero.
    pub fn normalize(short: f64, medium: f64, long: f64) -> Option<Self> {
        if short < 0.0 || medium < 0.0 || long < 0.0 {
            return None;
        }
        let total = short + medium + long;
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        Some(Self {
            short: short / total,
            medium: medium / total,
            long: long / total,
        })
    }

    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Short => self.short,
            Tier::Medium => self.medium,
            Tier::Long => self.long,
        }
    }

    /// Split `count` across tiers.
    ///
    /// Each tier gets `floor(count * ratio)`; the rounding remainder goes to
    /// the tier with the largest ratio, ties resolved medium, short, long.
    pub fn split(&self, count: usize) -> [usize; 3] {
        let mut counts = [
            (count as f64 * self.short) as usize,
            (count as f64 * self.medium) as usize,
            (count as f64 * self.long) as usize,
        ];

        let total: usize = counts.iter().sum();
        if total < count {
            let diff = count - total;
            if self.medium >= self.short && self.medium >= self.long {
                counts[Tier::Medium.index()] += diff;
            } else if self.short >= self.long {
                counts[Tier::Short.index()] += diff;
            } else {
                counts[Tier::Long.index()] += diff;
            }
        }

        counts
    }
}

impl Default for TierRatios {
    fn default() -> Self {
        Self {
            short: 0.3,
            medium: 0.5,
            long: 0.2,
        }
    }
}

/// Check that a token is non-empty and made of ASCII letters only
pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic())
}

/// Read a line-delimited dictionary.
///
/// Lines are trimmed and kept only if they are letters-only; kept words are
/// lower-cased. An empty result is an error.
pub fn load_words<R: BufRead>(reader: R) -> Result<Vec<String>, LoadError> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if is_valid_word(word) {
            words.push(word.to_ascii_lowercase());
        }
    }

    if words.is_empty() {
        return Err(LoadError::EmptyDictionary);
    }
    Ok(words)
}

/// Read a line-delimited sentence list.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_sentences<R: BufRead>(reader: R) -> Result<Vec<String>, LoadError> {
    let mut sentences = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let sentence = line.trim();
        if !sentence.is_empty() && !sentence.starts_with('#') {
            sentences.push(sentence.to_string());
        }
    }

    if sentences.is_empty() {
        return Err(LoadError::EmptyDictionary);
    }
    Ok(sentences)
}

/// Three tiers of candidate words plus the set of words already drawn
#[derive(Debug, Clone, Default)]
pub struct WordPool {
    tiers: [Vec<String>; 3],
    ratios: TierRatios,
    used: HashSet<String>,
}

impl WordPool {
    pub fn new(short: Vec<String>, medium: Vec<String>, long: Vec<String>, ratios: TierRatios) -> Self {
        Self {
            tiers: [short, medium, long],
            ratios,
            used: HashSet::new(),
        }
    }

    /// True when every tier is empty
    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(|t| t.is_empty())
    }

    pub fn tier(&self, tier: Tier) -> &[String] {
        &self.tiers[tier.index()]
    }

    /// Total number of candidate words across tiers
    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    /// Forget every drawn word (called at each session start)
    pub fn reset_usage(&mut self) {
        self.used.clear();
    }

    fn all_words(&self) -> impl Iterator<Item = &String> {
        self.tiers.iter().flatten()
    }

    /// Draw with the pool's configured ratios
    pub fn draw_words<R: Rng>(&mut self, count: usize, rng: &mut R) -> Result<Vec<Word>, GameError> {
        let ratios = self.ratios;
        self.draw_words_with(count, ratios, rng)
    }

    /// Draw up to `count` distinct, never-before-drawn words.
    ///
    /// Tier counts follow [`TierRatios::split`]; a short tier is topped up
    /// from whatever remains in any tier. The combined result is shuffled.
    /// Fewer than `count` words are returned only when the pool runs dry.
    pub fn draw_words_with<R: Rng>(
        &mut self,
        count: usize,
        ratios: TierRatios,
        rng: &mut R,
    ) -> Result<Vec<Word>, GameError> {
        if self.is_empty() {
            return Err(GameError::NoDictionariesLoaded);
        }

        let count = if count == 0 { DEFAULT_WORD_COUNT } else { count };
        let split = ratios.split(count);

        let mut drawn: Vec<String> = Vec::with_capacity(count);
        for tier in Tier::all() {
            let candidates: Vec<String> = self.tiers[tier.index()]
                .iter()
                .filter(|w| !self.used.contains(*w))
                .cloned()
                .collect();
            drawn.extend(self.take_random(candidates, split[tier.index()], rng));
        }

        if drawn.len() < count {
            let needed = count - drawn.len();
            let leftovers: Vec<String> = self
                .all_words()
                .filter(|w| !self.used.contains(*w))
                .cloned()
                .collect();
            drawn.extend(self.take_random(leftovers, needed, rng));
        }

        drawn.shuffle(rng);
        Ok(drawn.into_iter().map(Word::new).collect())
    }

    /// Remove up to `count` random entries from `candidates` and mark them used.
    fn take_random<R: Rng>(&mut self, mut candidates: Vec<String>, count: usize, rng: &mut R) -> Vec<String> {
        let mut picked = Vec::with_capacity(count.min(candidates.len()));
        while picked.len() < count && !candidates.is_empty() {
            let idx = rng.random_range(0..candidates.len());
            let word = candidates.swap_remove(idx);
            // a word listed in two tiers must still be drawn once
            if self.used.insert(word.clone()) {
                picked.push(word);
            }
        }
        picked
    }

    /// Uniform pick over all tiers, ignoring usage tracking
    pub fn pick_any<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        let total = self.len();
        if total == 0 {
            return None;
        }
        let idx = rng.random_range(0..total);
        self.all_words().nth(idx).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample_pool() -> WordPool {
        WordPool::new(
            strings(&["cat", "dog", "sun", "map", "pen", "cup", "hat", "box"]),
            strings(&["garden", "pencil", "window", "rocket", "silver", "basket"]),
            strings(&["adventure", "brilliant", "chocolate", "dangerous"]),
            TierRatios::default(),
        )
    }

    #[test]
    fn test_load_words_filters_and_lowercases() {
        let source = Cursor::new("  Apple \n\nbanana\nfoo-bar\nx1\n  cherry\n");
        let words = load_words(source).unwrap();
        assert_eq!(words, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_load_words_empty_is_error() {
        let source = Cursor::new("123\n\n--\n");
        assert!(matches!(load_words(source), Err(LoadError::EmptyDictionary)));
    }

    #[test]
    fn test_load_sentences_skips_comments() {
        let source = Cursor::new("# header\n\nThe quick fox.\n   \n  # indented comment\nHello, world!\n");
        let sentences = load_sentences(source).unwrap();
        assert_eq!(sentences, vec!["The quick fox.", "Hello, world!"]);
    }

    #[test]
    fn test_normalize_ratios() {
        let r = TierRatios::normalize(30.0, 50.0, 20.0).unwrap();
        assert!((r.short - 0.3).abs() < 1e-9);
        assert!((r.medium - 0.5).abs() < 1e-9);
        assert!((r.long - 0.2).abs() < 1e-9);

        let r = TierRatios::normalize(1.0, 2.0, 1.0).unwrap();
        assert!((r.short - 0.25).abs() < 1e-9);

        assert!(TierRatios::normalize(0.0, 0.0, 0.0).is_none());
        assert!(TierRatios::normalize(-1.0, 50.0, 50.0).is_none());
    }

    #[test]
    fn test_split_assigns_remainder_to_largest() {
        let r = TierRatios::normalize(1.0, 1.0, 1.0).unwrap();
        // 3 each, remainder 1 goes to medium on a three-way tie
        assert_eq!(r.split(10), [3, 4, 3]);

        let r = TierRatios::normalize(2.0, 1.0, 2.0).unwrap();
        // short wins the short/long tie
        assert_eq!(r.split(3), [2, 0, 1]);

        let r = TierRatios::normalize(0.0, 1.0, 3.0).unwrap();
        assert_eq!(r.split(7), [0, 1, 6]);
    }

    #[test]
    fn test_split_conserves_count() {
        let r = TierRatios::default();
        for n in 1..60 {
            let s = r.split(n);
            assert_eq!(s.iter().sum::<usize>(), n, "split of {}", n);
        }
    }

    #[test]
    fn test_draw_returns_exact_count() {
        let mut pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(7);
        let words = pool.draw_words(10, &mut rng).unwrap();
        assert_eq!(words.len(), 10);
        assert!(words.iter().all(|w| !w.completed));
    }

    #[test]
    fn test_draws_never_repeat_within_session() {
        let mut pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();
        for _ in 0..3 {
            for w in pool.draw_words(5, &mut rng).unwrap() {
                assert!(seen.insert(w.text.clone()), "{} drawn twice", w.text);
            }
        }
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn test_draw_falls_back_when_tier_exhausted() {
        let mut pool = WordPool::new(
            strings(&["a", "b", "c", "d", "e", "f"]),
            strings(&["mm"]),
            Vec::new(),
            TierRatios::normalize(0.0, 1.0, 0.0).unwrap(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let words = pool.draw_words(4, &mut rng).unwrap();
        assert_eq!(words.len(), 4);
        assert!(words.iter().any(|w| w.text == "mm"));
    }

    #[test]
    fn test_draw_returns_what_is_left() {
        let mut pool = WordPool::new(strings(&["go"]), Vec::new(), Vec::new(), TierRatios::default());
        let mut rng = StdRng::seed_from_u64(1);
        let words = pool.draw_words(5, &mut rng).unwrap();
        assert_eq!(words.len(), 1);
        assert!(pool.draw_words(5, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_reset_usage_allows_redraw() {
        let mut pool = WordPool::new(strings(&["go"]), Vec::new(), Vec::new(), TierRatios::default());
        let mut rng = StdRng::seed_from_u64(1);
        pool.draw_words(1, &mut rng).unwrap();
        assert!(pool.used.contains("go"));

        pool.reset_usage();
        assert_eq!(pool.draw_words(1, &mut rng).unwrap()[0].text, "go");
    }

    #[test]
    fn test_draw_from_empty_pool_fails() {
        let mut pool = WordPool::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            pool.draw_words(5, &mut rng),
            Err(GameError::NoDictionariesLoaded)
        ));
    }

    #[test]
    fn test_zero_count_uses_default() {
        let mut pool = sample_pool();
        let mut rng = StdRng::seed_from_u64(5);
        let words = pool.draw_words(0, &mut rng).unwrap();
        // pool has 18 words, fewer than the default of 20
        assert_eq!(words.len(), 18);
    }

    #[test]
    fn test_seeded_draw_is_deterministic() {
        let mut a = sample_pool();
        let mut b = sample_pool();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let wa: Vec<String> = a.draw_words(8, &mut rng_a).unwrap().into_iter().map(|w| w.text).collect();
        let wb: Vec<String> = b.draw_words(8, &mut rng_b).unwrap().into_iter().map(|w| w.text).collect();
        assert_eq!(wa, wb);
    }

    #[test]
    fn test_pick_any_ignores_usage() {
        let mut pool = WordPool::new(strings(&["go"]), Vec::new(), Vec::new(), TierRatios::default());
        let mut rng = StdRng::seed_from_u64(9);
        pool.draw_words(1, &mut rng).unwrap();
        assert_eq!(pool.pick_any(&mut rng), Some("go"));
        assert_eq!(WordPool::default().pick_any(&mut rng), None);
    }
}
