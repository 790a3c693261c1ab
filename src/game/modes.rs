//! Per-mode state blocks
//!
//! Exactly one block lives in the game while a session exists; each carries
//! only the state its mode needs.

use super::board::WordBoard;
use super::rhythm::RhythmDanceState;
use super::settings::RhythmMasterSettings;
use super::underwater::UnderwaterState;
use super::GameMode;
use std::time::{Duration, Instant};

/// Type one sentence character by character
#[derive(Debug, Clone)]
pub struct SentenceRound {
    target: String,
}

impl SentenceRound {
    pub fn new(target: String) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Length in characters, the unit input is compared in
    pub fn len(&self) -> usize {
        self.target.chars().count()
    }

    /// Whether the target has `ch` at character position `pos`
    pub fn matches_at(&self, pos: usize, ch: char) -> bool {
        self.target.chars().nth(pos) == Some(ch)
    }
}

/// Eliminate as many words as possible before the clock runs out
#[derive(Debug, Clone)]
pub struct CountdownRound {
    pub board: WordBoard,
    started_at: Instant,
    duration: Duration,
}

impl CountdownRound {
    pub fn new(board: WordBoard, duration: Duration, now: Instant) -> Self {
        Self {
            board,
            started_at: now,
            duration,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    pub fn is_over(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Clear a fixed list as fast as possible
#[derive(Debug, Clone)]
pub struct SpeedRunRound {
    pub board: WordBoard,
    target_words: usize,
}

impl SpeedRunRound {
    pub fn new(board: WordBoard, target_words: usize) -> Self {
        Self { board, target_words }
    }

    pub fn target_words(&self) -> usize {
        self.target_words
    }
}

/// Each word must be typed within a limit that shrinks every few words
#[derive(Debug, Clone)]
pub struct RhythmMasterRound {
    pub board: WordBoard,
    settings: RhythmMasterSettings,
    streak: u32,
    level: u32,
    time_limit: Duration,
    word_started_at: Instant,
}

impl RhythmMasterRound {
    pub fn new(board: WordBoard, settings: RhythmMasterSettings, now: Instant) -> Self {
        let time_limit = settings.time_limit_for_level(0);
        Self {
            board,
            settings,
            streak: 0,
            level: 0,
            time_limit,
            word_started_at: now,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Count a completed word and restart the word timer.
    ///
    /// Returns true when the difficulty level went up.
    pub fn record_success(&mut self, now: Instant) -> bool {
        self.streak += 1;
        self.word_started_at = now;

        let per_level = self.settings.words_per_level.max(1);
        if self.streak % per_level != 0 {
            return false;
        }
        self.level += 1;
        self.time_limit = self.settings.time_limit_for_level(self.level);
        true
    }

    pub fn word_time_remaining(&self, now: Instant) -> Duration {
        self.time_limit
            .saturating_sub(now.saturating_duration_since(self.word_started_at))
    }

    pub fn is_word_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.word_started_at) >= self.time_limit
    }
}

/// State of the active session, one variant per mode
#[derive(Debug, Clone)]
pub enum ModeState {
    Classic(WordBoard),
    Sentence(SentenceRound),
    Countdown(CountdownRound),
    SpeedRun(SpeedRunRound),
    RhythmMaster(RhythmMasterRound),
    Underwater(UnderwaterState),
    RhythmDance(RhythmDanceState),
}

impl ModeState {
    pub fn mode(&self) -> GameMode {
        match self {
            ModeState::Classic(_) => GameMode::Classic,
            ModeState::Sentence(_) => GameMode::Sentence,
            ModeState::Countdown(_) => GameMode::Countdown,
            ModeState::SpeedRun(_) => GameMode::SpeedRun,
            ModeState::RhythmMaster(_) => GameMode::RhythmMaster,
            ModeState::Underwater(_) => GameMode::UnderwaterCountdown,
            ModeState::RhythmDance(_) => GameMode::RhythmDance,
        }
    }

    /// Word list of the word-elimination modes
    pub fn board(&self) -> Option<&WordBoard> {
        match self {
            ModeState::Classic(board) => Some(board),
            ModeState::Countdown(round) => Some(&round.board),
            ModeState::SpeedRun(round) => Some(&round.board),
            ModeState::RhythmMaster(round) => Some(&round.board),
            _ => None,
        }
    }

    pub fn board_mut(&mut self) -> Option<&mut WordBoard> {
        match self {
            ModeState::Classic(board) => Some(board),
            ModeState::Countdown(round) => Some(&mut round.board),
            ModeState::SpeedRun(round) => Some(&mut round.board),
            ModeState::RhythmMaster(round) => Some(&mut round.board),
            _ => None,
        }
    }

    /// Shift every mode clock forward by a paused interval
    pub fn postpone(&mut self, by: Duration) {
        match self {
            ModeState::Countdown(round) => round.started_at += by,
            ModeState::RhythmMaster(round) => round.word_started_at += by,
            ModeState::Underwater(state) => state.postpone(by),
            ModeState::RhythmDance(state) => state.postpone(by),
            ModeState::Classic(_) | ModeState::Sentence(_) | ModeState::SpeedRun(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Word;
    use crate::game::settings::ModeSettings;

    fn board(texts: &[&str]) -> WordBoard {
        WordBoard::new(texts.iter().map(|t| Word::new(*t)).collect())
    }

    #[test]
    fn test_sentence_matches_by_char() {
        let round = SentenceRound::new("hi there".to_string());
        assert_eq!(round.len(), 8);
        assert!(round.matches_at(0, 'h'));
        assert!(!round.matches_at(1, 'x'));
        assert!(round.matches_at(2, ' '));
        assert!(!round.matches_at(8, 'e'));
    }

    #[test]
    fn test_countdown_clock() {
        let t0 = Instant::now();
        let round = CountdownRound::new(board(&["a"]), Duration::from_secs(60), t0);
        assert_eq!(round.remaining(t0 + Duration::from_secs(20)), Duration::from_secs(40));
        assert!(!round.is_over(t0 + Duration::from_secs(59)));
        assert!(round.is_over(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_postpone_shifts_countdown() {
        let t0 = Instant::now();
        let round = CountdownRound::new(board(&["a"]), Duration::from_secs(60), t0);
        let mut state = ModeState::Countdown(round);
        state.postpone(Duration::from_secs(5));

        let ModeState::Countdown(round) = &state else {
            panic!("expected countdown");
        };
        assert!(!round.is_over(t0 + Duration::from_secs(61)));
        assert!(round.is_over(t0 + Duration::from_secs(65)));
    }

    #[test]
    fn test_rhythm_master_levels_up_every_n_words() {
        let t0 = Instant::now();
        let settings = ModeSettings::default().rhythm_master;
        let mut round = RhythmMasterRound::new(board(&["a"]), settings, t0);
        assert_eq!(round.time_limit(), Duration::from_secs(2));

        for i in 1..10 {
            assert!(!round.record_success(t0), "word {}", i);
        }
        assert!(round.record_success(t0));
        assert_eq!(round.level(), 1);
        assert_eq!(round.streak(), 10);
        assert_eq!(round.time_limit(), Duration::from_millis(1900));
    }

    #[test]
    fn test_rhythm_master_word_timer_restarts() {
        let t0 = Instant::now();
        let settings = ModeSettings::default().rhythm_master;
        let mut round = RhythmMasterRound::new(board(&["a"]), settings, t0);
        assert!(round.is_word_expired(t0 + Duration::from_secs(2)));

        round.record_success(t0 + Duration::from_millis(1500));
        assert!(!round.is_word_expired(t0 + Duration::from_secs(3)));
        assert_eq!(
            round.word_time_remaining(t0 + Duration::from_secs(3)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_zero_words_per_level_does_not_panic() {
        let t0 = Instant::now();
        let mut settings = ModeSettings::default().rhythm_master;
        settings.words_per_level = 0;
        let mut round = RhythmMasterRound::new(board(&["a"]), settings, t0);
        assert!(round.record_success(t0));
    }

    #[test]
    fn test_board_access_by_mode() {
        let state = ModeState::Classic(board(&["a"]));
        assert_eq!(state.mode(), GameMode::Classic);
        assert!(state.board().is_some());

        let state = ModeState::Sentence(SentenceRound::new("x".to_string()));
        assert!(state.board().is_none());
    }
}
