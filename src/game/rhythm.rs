//! Rhythm judgment engine for rhythm dance mode
//!
//! A pointer sweeps a bar from left to right and wraps back to the start.
//! Submitting the current word judges how close the pointer is to the golden
//! ratio mark, measured in whole character cells of the rendered bar:
//!
//! | distance | judgment | score | combo |
//! |----------|----------|-------|-------|
//! | 0        | Perfect  | +5    | +1    |
//! | 1..=2    | Nice     | +3    | +1    |
//! | 3..=4    | OK       | +1    | reset |
//! | > 4      | Miss     | -1    | reset |

use super::dance::DanceAnimation;
use super::settings::RhythmDanceSettings;
use super::words::WordPool;
use rand::Rng;
use std::time::{Duration, Instant};

/// Width of the rhythm bar in character cells
pub const BAR_WIDTH: usize = 35;

/// Position of the target mark on the bar
pub const GOLDEN_RATIO: f64 = 0.618;

/// Upcoming-word window length
pub const QUEUE_LEN: usize = 5;

/// Slot of the word being typed; slots before it are history
pub const CURRENT_SLOT: usize = 2;

/// Sampling attempts before a duplicate queue word is accepted
const UNIQUE_ATTEMPTS: usize = 100;

/// Timing tier of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgment {
    Perfect,
    Nice,
    Ok,
    Miss,
}

impl Judgment {
    /// Classify a cell distance between pointer and target
    pub fn from_distance(distance: usize) -> Self {
        match distance {
            0 => Judgment::Perfect,
            1..=2 => Judgment::Nice,
            3..=4 => Judgment::Ok,
            _ => Judgment::Miss,
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            Judgment::Perfect => 5,
            Judgment::Nice => 3,
            Judgment::Ok => 1,
            Judgment::Miss => -1,
        }
    }

    /// Whether this judgment extends the combo
    pub fn keeps_combo(&self) -> bool {
        matches!(self, Judgment::Perfect | Judgment::Nice)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Judgment::Perfect => "Perfect",
            Judgment::Nice => "Nice",
            Judgment::Ok => "OK",
            Judgment::Miss => "Miss",
        }
    }
}

/// Bar cell of a normalized position
pub fn cell_of(position: f64) -> usize {
    (position.clamp(0.0, 1.0) * BAR_WIDTH as f64) as usize
}

/// Absolute cell distance between the pointer and the target
pub fn cell_distance(pointer: f64, target: f64) -> usize {
    cell_of(pointer).abs_diff(cell_of(target))
}

/// The most recent judgment, kept for display effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastJudgment {
    pub judgment: Judgment,
    pub at: Instant,
    /// Pointer position at judgment time, `None` for a typed mismatch
    pub position: Option<f64>,
}

/// Per-tier judgment counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub nice: u32,
    pub ok: u32,
    pub miss: u32,
}

impl JudgmentCounts {
    fn record(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Perfect => self.perfect += 1,
            Judgment::Nice => self.nice += 1,
            Judgment::Ok => self.ok += 1,
            Judgment::Miss => self.miss += 1,
        }
    }
}

/// State of one rhythm dance session
#[derive(Debug, Clone)]
pub struct RhythmDanceState {
    pointer_position: f64,
    pointer_direction: i8,
    pointer_speed: f64,
    speed_increment: f64,
    golden_ratio: f64,
    queue: [String; QUEUE_LEN],
    completed_words: u32,
    total_score: i32,
    counts: JudgmentCounts,
    combo: u32,
    max_combo: u32,
    history: Vec<Judgment>,
    last_judgment: Option<LastJudgment>,
    started_at: Instant,
    duration: Duration,
    miss_limit: u32,
    animation: DanceAnimation,
}

impl RhythmDanceState {
    /// Start a session; `upcoming` fills the current slot and the slots after
    /// it, history slots start empty.
    pub fn new(settings: &RhythmDanceSettings, upcoming: [String; QUEUE_LEN - CURRENT_SLOT], now: Instant) -> Self {
        let [current, next, after] = upcoming;
        Self {
            pointer_position: 0.0,
            pointer_direction: 1,
            pointer_speed: settings.initial_speed,
            speed_increment: settings.speed_increment,
            golden_ratio: GOLDEN_RATIO,
            queue: [String::new(), String::new(), current, next, after],
            completed_words: 0,
            total_score: 0,
            counts: JudgmentCounts::default(),
            combo: 0,
            max_combo: 0,
            history: Vec::new(),
            last_judgment: None,
            started_at: now,
            duration: settings.duration,
            miss_limit: settings.miss_limit,
            animation: DanceAnimation::new(now),
        }
    }

    pub fn pointer_position(&self) -> f64 {
        self.pointer_position
    }

    pub fn golden_ratio(&self) -> f64 {
        self.golden_ratio
    }

    pub fn queue(&self) -> &[String; QUEUE_LEN] {
        &self.queue
    }

    /// The word judged against the input
    pub fn current_word(&self) -> &str {
        &self.queue[CURRENT_SLOT]
    }

    pub fn completed_words(&self) -> u32 {
        self.completed_words
    }

    pub fn total_score(&self) -> i32 {
        self.total_score
    }

    pub fn counts(&self) -> JudgmentCounts {
        self.counts
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn history(&self) -> &[Judgment] {
        &self.history
    }

    pub fn last_judgment(&self) -> Option<LastJudgment> {
        self.last_judgment
    }

    pub fn animation(&self) -> &DanceAnimation {
        &self.animation
    }

    /// One simulation step: move the pointer and the dancer
    pub fn step(&mut self, now: Instant) {
        self.advance_pointer();
        self.animation.update(now);
    }

    /// Move the pointer; reaching the right edge starts a new sweep
    pub fn advance_pointer(&mut self) {
        self.pointer_position += self.pointer_speed * f64::from(self.pointer_direction);
        if self.pointer_position >= 1.0 {
            self.pointer_position = 0.0;
        } else if self.pointer_position < 0.0 {
            self.pointer_position = 0.0;
            self.pointer_direction = 1;
        }
    }

    /// Judge a correctly typed word by pointer timing.
    ///
    /// The pointer restarts its sweep from the left afterwards.
    pub fn judge_timing(&mut self, now: Instant) -> Judgment {
        let distance = cell_distance(self.pointer_position, self.golden_ratio);
        let judgment = Judgment::from_distance(distance);
        self.apply(judgment, Some(self.pointer_position), now);

        self.pointer_position = 0.0;
        self.pointer_direction = 1;
        judgment
    }

    /// Penalize a typed word that does not match the current word.
    ///
    /// The pointer keeps sweeping.
    pub fn record_mismatch(&mut self, now: Instant) {
        self.apply(Judgment::Miss, None, now);
    }

    fn apply(&mut self, judgment: Judgment, position: Option<f64>, now: Instant) {
        self.counts.record(judgment);
        if judgment.keeps_combo() {
            self.combo += 1;
        } else {
            self.combo = 0;
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.total_score += judgment.score();
        self.history.push(judgment);
        self.last_judgment = Some(LastJudgment {
            judgment,
            at: now,
            position,
        });
        self.animation.trigger(judgment, now);
    }

    /// Shift the queue left, append `next_word`, and speed up the pointer
    pub fn complete_word(&mut self, next_word: String) {
        self.completed_words += 1;
        self.pointer_speed += self.speed_increment;
        self.queue.rotate_left(1);
        self.queue[QUEUE_LEN - 1] = next_word;
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    /// Push the session clock back by a paused interval
    pub fn postpone(&mut self, by: Duration) {
        self.started_at += by;
        if let Some(last) = self.last_judgment.as_mut() {
            last.at += by;
        }
        self.animation.postpone(by);
    }

    /// Time is up or too many misses
    pub fn is_over(&self, now: Instant) -> bool {
        self.counts.miss >= self.miss_limit
            || now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Pick a word not present in `existing`.
///
/// After a bounded number of attempts a duplicate is accepted so a tiny pool
/// cannot stall the game.
pub fn pick_unique_word<R: Rng>(pool: &WordPool, rng: &mut R, existing: &[String]) -> Option<String> {
    for _ in 0..UNIQUE_ATTEMPTS {
        let word = pool.pick_any(rng)?;
        if !existing.iter().any(|e| e == word) {
            return Some(word.to_string());
        }
    }
    pool.pick_any(rng).map(str::to_string)
}
