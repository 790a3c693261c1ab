//! Session statistics
//!
//! This module provides:
//! - Keystroke, accuracy and completion counters for one play session
//! - Pause-aware elapsed time accounting
//! - Derived rates (letters/second, words/second, accuracy)
//!
//! All time-dependent queries take an explicit `now` so that a session can be
//! replayed deterministically in tests.

use std::time::{Duration, Instant};

/// Below this many elapsed seconds the derived rates report zero.
const MIN_RATE_WINDOW_SECS: f64 = 0.1;

/// Counters and timing state for one session.
///
/// Counters only grow between two calls to [`Statistics::reset`].
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    total_keystrokes: u32,
    valid_keystrokes: u32,
    correct_chars: u32,
    words_completed: u32,
    total_letters: u32,

    start_time: Option<Instant>,
    end_time: Option<Instant>,
    pause_start_time: Option<Instant>,
    total_paused: Duration,
}

impl Statistics {
    /// Create an empty statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every counter and all timing state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the wall-clock start of the session
    pub fn start(&mut self, now: Instant) {
        self.start_time = Some(now);
    }

    /// Begin a pause. Calling this while already paused does nothing.
    pub fn pause(&mut self, now: Instant) {
        if self.pause_start_time.is_none() {
            self.pause_start_time = Some(now);
        }
    }

    /// End a pause and fold its length into the paused total.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.pause_start_time.take() {
            self.total_paused += now.saturating_duration_since(paused_at);
        }
    }

    /// Freeze the clock. A pending pause is closed first.
    pub fn finish(&mut self, now: Instant) {
        self.resume(now);
        self.end_time = Some(now);
    }

    pub fn add_keystroke(&mut self) {
        self.total_keystrokes += 1;
    }

    pub fn add_valid_keystroke(&mut self) {
        self.valid_keystrokes += 1;
    }

    pub fn add_correct_char(&mut self) {
        self.correct_chars += 1;
    }

    /// Count a completed word and its letters
    pub fn add_completed_word(&mut self, word_len: usize) {
        self.words_completed += 1;
        self.total_letters += word_len as u32;
    }

    pub fn total_keystrokes(&self) -> u32 {
        self.total_keystrokes
    }

    pub fn valid_keystrokes(&self) -> u32 {
        self.valid_keystrokes
    }

    pub fn correct_chars(&self) -> u32 {
        self.correct_chars
    }

    pub fn words_completed(&self) -> u32 {
        self.words_completed
    }

    pub fn total_letters(&self) -> u32 {
        self.total_letters
    }

    /// Elapsed session time excluding every paused interval.
    ///
    /// Uses the end time once the session is finished, otherwise `now`.
    /// A pause that is still open is excluded up to `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let Some(start) = self.start_time else {
            return Duration::ZERO;
        };

        let until = self.end_time.unwrap_or(now);
        let mut paused = self.total_paused;
        if let Some(paused_at) = self.pause_start_time {
            paused += until.saturating_duration_since(paused_at);
        }

        until.saturating_duration_since(start).saturating_sub(paused)
    }

    /// Elapsed session time in seconds, never negative
    pub fn elapsed_seconds(&self, now: Instant) -> f64 {
        self.elapsed(now).as_secs_f64()
    }

    /// Completed letters per second (0 during the first tenth of a second)
    pub fn letters_per_second(&self, now: Instant) -> f64 {
        let elapsed = self.elapsed_seconds(now);
        if elapsed < MIN_RATE_WINDOW_SECS {
            return 0.0;
        }
        self.total_letters as f64 / elapsed
    }

    /// Completed words per second (0 during the first tenth of a second)
    pub fn words_per_second(&self, now: Instant) -> f64 {
        let elapsed = self.elapsed_seconds(now);
        if elapsed < MIN_RATE_WINDOW_SECS {
            return 0.0;
        }
        self.words_completed as f64 / elapsed
    }

    /// Share of keystrokes that were correct, in percent.
    ///
    /// Clamped to 100 since the confirm key can be credited as correct
    /// without being counted as a keystroke in some modes.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_keystrokes == 0 {
            return 0.0;
        }
        (self.correct_chars as f64 / self.total_keystrokes as f64 * 100.0).min(100.0)
    }
}
