//! Game logic: mode state machine, input matching, timers, scoring

pub mod board;
pub mod dance;
pub mod dictionary;
pub mod modes;
pub mod rhythm;
pub mod settings;
pub mod underwater;
pub mod words;

use board::{Word, WordBoard};
use log::{debug, info};
use modes::{CountdownRound, ModeState, RhythmMasterRound, SentenceRound, SpeedRunRound};
use rand::prelude::*;
use rand::rngs::StdRng;
use rhythm::{pick_unique_word, Judgment, RhythmDanceState, CURRENT_SLOT, QUEUE_LEN};
use settings::ModeSettings;
use std::time::{Duration, Instant};
use underwater::UnderwaterState;
use words::WordPool;

use crate::stats::Statistics;

/// Entries in the pause menu: Resume, Restart, Select Mode, Main Menu
pub const PAUSE_MENU_LEN: usize = 4;

/// Entries in the results menu: Restart, Select Mode, Main Menu
pub const RESULTS_MENU_LEN: usize = 3;

/// A resource a mode needs before it can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    WordDictionaries,
    Sentences,
}

/// Errors returned when a mode cannot start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    ResourceNotLoaded(Resource),
    NoDictionariesLoaded,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::ResourceNotLoaded(Resource::WordDictionaries) => {
                write!(f, "word dictionaries not loaded")
            }
            GameError::ResourceNotLoaded(Resource::Sentences) => {
                write!(f, "sentence dictionary not loaded")
            }
            GameError::NoDictionariesLoaded => write!(f, "no word dictionaries loaded"),
        }
    }
}

impl std::error::Error for GameError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Classic,
    Sentence,
    Countdown,
    SpeedRun,
    RhythmMaster,
    UnderwaterCountdown,
    RhythmDance,
}

impl GameMode {
    /// Modes in menu order
    pub fn all() -> [GameMode; 7] {
        [
            GameMode::Classic,
            GameMode::Sentence,
            GameMode::Countdown,
            GameMode::SpeedRun,
            GameMode::RhythmMaster,
            GameMode::UnderwaterCountdown,
            GameMode::RhythmDance,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Sentence => "Sentence",
            GameMode::Countdown => "Countdown",
            GameMode::SpeedRun => "Speed Run",
            GameMode::RhythmMaster => "Rhythm Master",
            GameMode::UnderwaterCountdown => "Underwater",
            GameMode::RhythmDance => "Rhythm Dance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Classic => "Clear every word on the board",
            GameMode::Sentence => "Type a full sentence, punctuation included",
            GameMode::Countdown => "Eliminate as many words as you can before time runs out",
            GameMode::SpeedRun => "Clear a fixed set of words against the clock",
            GameMode::RhythmMaster => "Each word has a time limit that keeps shrinking",
            GameMode::UnderwaterCountdown => "Catch swimming fish by typing their words",
            GameMode::RhythmDance => "Submit each word as the pointer hits the golden mark",
        }
    }

    /// Stable identifier used for persisted records
    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Sentence => "sentence",
            GameMode::Countdown => "countdown",
            GameMode::SpeedRun => "speed_run",
            GameMode::RhythmMaster => "rhythm_master",
            GameMode::UnderwaterCountdown => "underwater",
            GameMode::RhythmDance => "rhythm_dance",
        }
    }

    /// Whether the mode draws from the word dictionaries
    fn needs_words(&self) -> bool {
        !matches!(self, GameMode::Sentence)
    }
}

/// The game aggregate: one session of one mode at a time
#[derive(Debug)]
pub struct Game {
    status: GameStatus,
    round: Option<ModeState>,
    input: String,
    stats: Statistics,
    aborted: bool,
    pause_menu_index: usize,
    results_menu_index: usize,
    paused_at: Option<Instant>,
    pool: WordPool,
    sentences: Vec<String>,
    settings: ModeSettings,
    rng: StdRng,
}

impl Game {
    pub fn new(pool: WordPool, sentences: Vec<String>, settings: ModeSettings, rng: StdRng) -> Self {
        Self {
            status: GameStatus::Idle,
            round: None,
            input: String::new(),
            stats: Statistics::new(),
            aborted: false,
            pause_menu_index: 0,
            results_menu_index: 0,
            paused_at: None,
            pool,
            sentences,
            settings,
            rng,
        }
    }

    /// Start `mode` with the stored settings
    pub fn start(&mut self, mode: GameMode, now: Instant) -> Result<(), GameError> {
        match mode {
            GameMode::Classic => self.start_classic(now),
            GameMode::Sentence => self.start_sentence(now),
            GameMode::Countdown => self.start_countdown(now),
            GameMode::SpeedRun => self.start_speed_run(now),
            GameMode::RhythmMaster => self.start_rhythm_master(now),
            GameMode::UnderwaterCountdown => self.start_underwater(now),
            GameMode::RhythmDance => self.start_rhythm_dance(now),
        }
    }

    pub fn start_classic(&mut self, now: Instant) -> Result<(), GameError> {
        let board = self.prepare_board(GameMode::Classic, self.settings.word_count)?;
        self.begin(ModeState::Classic(board), now);
        Ok(())
    }

    pub fn start_sentence(&mut self, now: Instant) -> Result<(), GameError> {
        let Some(target) = self.sentences.choose(&mut self.rng).cloned() else {
            return Err(GameError::ResourceNotLoaded(Resource::Sentences));
        };
        self.begin(ModeState::Sentence(SentenceRound::new(target)), now);
        Ok(())
    }

    pub fn start_countdown(&mut self, now: Instant) -> Result<(), GameError> {
        let countdown = self.settings.countdown.clone();
        let board = self.prepare_board(GameMode::Countdown, countdown.initial_words)?;
        let round = CountdownRound::new(board, countdown.duration, now);
        self.begin(ModeState::Countdown(round), now);
        Ok(())
    }

    pub fn start_speed_run(&mut self, now: Instant) -> Result<(), GameError> {
        let target = self.settings.speed_run_words;
        let board = self.prepare_board(GameMode::SpeedRun, target)?;
        self.begin(ModeState::SpeedRun(SpeedRunRound::new(board, target)), now);
        Ok(())
    }

    pub fn start_rhythm_master(&mut self, now: Instant) -> Result<(), GameError> {
        let settings = self.settings.rhythm_master.clone();
        let board = self.prepare_board(GameMode::RhythmMaster, settings.initial_words)?;
        let round = RhythmMasterRound::new(board, settings, now);
        self.begin(ModeState::RhythmMaster(round), now);
        Ok(())
    }

    pub fn start_underwater(&mut self, now: Instant) -> Result<(), GameError> {
        self.require_words(GameMode::UnderwaterCountdown)?;
        let state = UnderwaterState::new(&self.settings.underwater, &self.pool, &mut self.rng, now);
        self.begin(ModeState::Underwater(state), now);
        Ok(())
    }

    pub fn start_rhythm_dance(&mut self, now: Instant) -> Result<(), GameError> {
        self.require_words(GameMode::RhythmDance)?;

        let mut upcoming: Vec<String> = Vec::with_capacity(QUEUE_LEN - CURRENT_SLOT);
        while upcoming.len() < QUEUE_LEN - CURRENT_SLOT {
            let word = pick_unique_word(&self.pool, &mut self.rng, &upcoming)
                .ok_or(GameError::NoDictionariesLoaded)?;
            upcoming.push(word);
        }
        let upcoming: [String; QUEUE_LEN - CURRENT_SLOT] = upcoming
            .try_into()
            .map_err(|_| GameError::NoDictionariesLoaded)?;

        let state = RhythmDanceState::new(&self.settings.rhythm_dance, upcoming, now);
        self.begin(ModeState::RhythmDance(state), now);
        Ok(())
    }

    fn require_words(&self, mode: GameMode) -> Result<(), GameError> {
        if mode.needs_words() && self.pool.is_empty() {
            return Err(GameError::ResourceNotLoaded(Resource::WordDictionaries));
        }
        Ok(())
    }

    /// Validate the dictionaries, reset usage tracking and draw a fresh board
    fn prepare_board(&mut self, mode: GameMode, count: usize) -> Result<WordBoard, GameError> {
        self.require_words(mode)?;
        self.pool.reset_usage();
        let words = self.pool.draw_words(count, &mut self.rng)?;
        Ok(WordBoard::new(words))
    }

    /// Reset the shared core and install the new mode block
    fn begin(&mut self, round: ModeState, now: Instant) {
        info!("starting {} mode", round.mode().label());
        self.round = Some(round);
        self.status = GameStatus::Running;
        self.input.clear();
        self.aborted = false;
        self.pause_menu_index = 0;
        self.results_menu_index = 0;
        self.paused_at = None;
        self.stats.reset();
        self.stats.start(now);
    }

    /// Feed one typed character
    pub fn add_char(&mut self, ch: char, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        if self.expire_if_due(now) {
            return;
        }
        let Some(round) = self.round.as_ref() else {
            return;
        };

        if let ModeState::Sentence(sentence) = round {
            if ch == ' ' || ch.is_ascii_graphic() {
                let pos = self.input.chars().count();
                let correct = sentence.matches_at(pos, ch);
                self.input.push(ch);
                self.stats.add_keystroke();
                if correct {
                    self.stats.add_correct_char();
                }
            }
            return;
        }

        if !ch.is_ascii_alphabetic() {
            return;
        }
        self.input.push(ch.to_ascii_lowercase());
        self.stats.add_keystroke();

        let on_track = match round {
            ModeState::RhythmDance(state) => state.current_word().starts_with(self.input.as_str()),
            ModeState::Underwater(state) => state.has_prefix_match(&self.input),
            other => other
                .board()
                .is_some_and(|board| board.has_prefix_match(&self.input)),
        };
        if on_track {
            self.stats.add_valid_keystroke();
            self.stats.add_correct_char();
        }
    }

    /// Remove the last typed character; still counts as a keystroke
    pub fn backspace(&mut self) {
        if self.status != GameStatus::Running {
            return;
        }
        if self.input.pop().is_some() {
            self.stats.add_keystroke();
        }
    }

    /// Submit the input (Enter)
    pub fn try_eliminate(&mut self, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        let Some(mode) = self.mode() else {
            return;
        };

        match mode {
            GameMode::Sentence => {
                let typed = self.input.chars().count();
                if matches!(&self.round, Some(ModeState::Sentence(s)) if s.len() == typed) {
                    self.finish(false, now);
                }
            }
            GameMode::UnderwaterCountdown => {
                let captured = match self.round.as_mut() {
                    Some(ModeState::Underwater(state)) => state.try_capture(&self.input, now),
                    _ => None,
                };
                if let Some(len) = captured {
                    self.stats.add_completed_word(len);
                    self.stats.add_correct_char();
                    self.input.clear();
                }
            }
            GameMode::RhythmDance => {
                self.try_rhythm_judgment(now);
            }
            GameMode::Classic | GameMode::Countdown | GameMode::SpeedRun | GameMode::RhythmMaster => {
                self.eliminate_word(now)
            }
        }
    }

    fn eliminate_word(&mut self, now: Instant) {
        self.stats.add_keystroke();
        if self.input.is_empty() {
            return;
        }
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let Some(len) = round
            .board_mut()
            .and_then(|board| board.eliminate(&self.input, now))
        else {
            return;
        };

        self.stats.add_correct_char();
        self.stats.add_completed_word(len);
        self.input.clear();

        let replenish = self.settings.replenish.clone();
        let mut needs_words = false;
        let mut finished = false;
        match round {
            ModeState::Classic(board) => finished = board.is_all_completed(),
            ModeState::SpeedRun(run) => finished = run.board.is_all_completed(),
            ModeState::Countdown(countdown) => {
                needs_words = countdown.board.remaining() < replenish.threshold;
            }
            ModeState::RhythmMaster(master) => {
                if master.record_success(now) {
                    info!(
                        "rhythm master level {} (limit {:?})",
                        master.level(),
                        master.time_limit()
                    );
                }
                needs_words = master.board.remaining() < replenish.threshold;
            }
            _ => {}
        }

        if needs_words {
            self.replenish_board(replenish.batch);
        }
        if finished {
            self.finish(false, now);
        }
    }

    /// Append freshly drawn words to the board
    fn replenish_board(&mut self, batch: usize) {
        let words: Vec<Word> = match self.pool.draw_words(batch, &mut self.rng) {
            Ok(words) => words,
            Err(_) => return,
        };
        debug!("replenishing board with {} words", words.len());
        if let Some(board) = self.round.as_mut().and_then(ModeState::board_mut) {
            board.extend(words);
        }
    }

    /// Judge the input against the current rhythm dance word.
    ///
    /// A mismatch is a Miss without a timing check; a match is judged by the
    /// pointer position and advances the queue.
    pub fn try_rhythm_judgment(&mut self, now: Instant) -> Option<Judgment> {
        if self.status != GameStatus::Running {
            return None;
        }
        let Some(ModeState::RhythmDance(state)) = self.round.as_mut() else {
            return None;
        };

        if self.input != state.current_word() {
            state.record_mismatch(now);
            self.input.clear();
            return Some(Judgment::Miss);
        }

        let judgment = state.judge_timing(now);
        self.stats.add_completed_word(self.input.len());
        self.input.clear();

        // slot 0 drops out on the shift, so only the survivors must differ
        let kept = state.queue()[1..].to_vec();
        let next = pick_unique_word(&self.pool, &mut self.rng, &kept).unwrap_or_default();
        if let Some(ModeState::RhythmDance(state)) = self.round.as_mut() {
            state.complete_word(next);
        }
        Some(judgment)
    }

    /// Finish timed modes whose clock has run out
    pub fn check_timeouts(&mut self, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        let expired = match &self.round {
            Some(ModeState::Countdown(round)) => round.is_over(now),
            Some(ModeState::RhythmMaster(round)) => round.is_word_expired(now),
            Some(ModeState::Underwater(state)) => state.is_over(now),
            Some(ModeState::RhythmDance(state)) => state.is_over(now),
            _ => false,
        };
        if expired {
            self.finish(false, now);
        }
    }

    /// Timeout check done before accepting a character
    fn expire_if_due(&mut self, now: Instant) -> bool {
        let expired = match &self.round {
            Some(ModeState::Countdown(round)) => round.is_over(now),
            Some(ModeState::RhythmMaster(round)) => round.is_word_expired(now),
            _ => false,
        };
        if expired {
            self.finish(false, now);
        }
        expired
    }

    /// One simulation step: move entities, then check timeouts
    pub fn tick(&mut self, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        match self.round.as_mut() {
            Some(ModeState::Underwater(state)) => {
                state.step(now, &self.pool, &mut self.rng);
                state.animate_background();
            }
            Some(ModeState::RhythmDance(state)) => state.step(now),
            _ => {}
        }
        self.check_timeouts(now);
    }

    pub fn pause(&mut self, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        self.status = GameStatus::Paused;
        self.pause_menu_index = 0;
        self.paused_at = Some(now);
        self.stats.pause(now);
        debug!("paused");
    }

    /// Resume; mode clocks are shifted so the pause does not count
    pub fn resume(&mut self, now: Instant) {
        if self.status != GameStatus::Paused {
            return;
        }
        self.status = GameStatus::Running;
        self.stats.resume(now);
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = now.saturating_duration_since(paused_at);
            if let Some(round) = self.round.as_mut() {
                round.postpone(paused_for);
            }
        }
        debug!("resumed");
    }

    pub fn abort(&mut self, now: Instant) {
        if self.status == GameStatus::Running {
            self.finish(true, now);
        }
    }

    fn finish(&mut self, aborted: bool, now: Instant) {
        self.status = GameStatus::Finished;
        self.aborted = aborted;
        self.results_menu_index = 0;
        self.stats.finish(now);
        if let Some(round) = &self.round {
            info!(
                "{} mode finished (aborted: {}, words: {}, elapsed: {:.2}s)",
                round.mode().label(),
                aborted,
                self.stats.words_completed(),
                self.stats.elapsed_seconds(now)
            );
        }
    }

    pub fn move_pause_menu(&mut self, delta: i32) {
        if self.status == GameStatus::Paused {
            self.pause_menu_index = clamp_index(self.pause_menu_index, delta, PAUSE_MENU_LEN);
        }
    }

    pub fn move_results_menu(&mut self, delta: i32) {
        if self.status == GameStatus::Finished {
            self.results_menu_index = clamp_index(self.results_menu_index, delta, RESULTS_MENU_LEN);
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.round.as_ref().map(ModeState::mode)
    }

    pub fn round(&self) -> Option<&ModeState> {
        self.round.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn pause_menu_index(&self) -> usize {
        self.pause_menu_index
    }

    pub fn results_menu_index(&self) -> usize {
        self.results_menu_index
    }

    /// All board words, completed ones included
    pub fn words(&self) -> &[Word] {
        self.board().map(WordBoard::words).unwrap_or(&[])
    }

    fn board(&self) -> Option<&WordBoard> {
        self.round.as_ref().and_then(ModeState::board)
    }

    /// Board indices of uncompleted words starting with the input
    pub fn matched_indices(&self) -> Vec<usize> {
        self.board()
            .map(|board| board.matched_indices(&self.input))
            .unwrap_or_default()
    }

    pub fn active_words(&self) -> Vec<&str> {
        self.board().map(WordBoard::active_words).unwrap_or_default()
    }

    pub fn target_sentence(&self) -> Option<&str> {
        match &self.round {
            Some(ModeState::Sentence(sentence)) => Some(sentence.target()),
            _ => None,
        }
    }

    /// Time left in the session clock of timed modes
    pub fn remaining_time(&self, now: Instant) -> Option<Duration> {
        let now = self.frozen(now);
        match &self.round {
            Some(ModeState::Countdown(round)) => Some(round.remaining(now)),
            Some(ModeState::Underwater(state)) => Some(state.remaining(now)),
            Some(ModeState::RhythmDance(state)) => Some(state.remaining(now)),
            _ => None,
        }
    }

    /// Time left for the current rhythm master word
    pub fn word_time_remaining(&self, now: Instant) -> Option<Duration> {
        match &self.round {
            Some(ModeState::RhythmMaster(round)) => Some(round.word_time_remaining(self.frozen(now))),
            _ => None,
        }
    }

    /// Elapsed speed run time, paused intervals excluded
    pub fn speed_run_time(&self, now: Instant) -> Option<Duration> {
        match &self.round {
            Some(ModeState::SpeedRun(_)) => Some(self.stats.elapsed(now)),
            _ => None,
        }
    }

    pub fn underwater(&self) -> Option<&UnderwaterState> {
        match &self.round {
            Some(ModeState::Underwater(state)) => Some(state),
            _ => None,
        }
    }

    pub fn rhythm_dance(&self) -> Option<&RhythmDanceState> {
        match &self.round {
            Some(ModeState::RhythmDance(state)) => Some(state),
            _ => None,
        }
    }

    pub fn rhythm_master(&self) -> Option<&RhythmMasterRound> {
        match &self.round {
            Some(ModeState::RhythmMaster(round)) => Some(round),
            _ => None,
        }
    }

    /// Clocks stand still while paused
    fn frozen(&self, now: Instant) -> Instant {
        match (self.status, self.paused_at) {
            (GameStatus::Paused, Some(paused_at)) => paused_at,
            _ => now,
        }
    }
}

fn clamp_index(current: usize, delta: i32, len: usize) -> usize {
    let next = current as i64 + i64::from(delta);
    next.clamp(0, len as i64 - 1) as usize
}
