//! Underwater countdown: fish carrying words drift across the sea
//!
//! Fish are placed on a coarse occupancy grid so their labels do not overlap
//! at spawn time. Afterwards they drift horizontally and wrap around; overlap
//! is not re-checked while moving. A caught fish glows for a moment, then
//! leaves the water and a new one takes its place.

use super::settings::UnderwaterSettings;
use super::words::WordPool;
use rand::Rng;
use std::time::{Duration, Instant};

/// Columns of the placement grid
pub const GRID_COLS: usize = 72;

/// Rows available to fish
pub const FISH_ROWS: usize = 16;

/// Screen rows above the first fish row, reserved for the waves
pub const TOP_MARGIN: usize = 2;

/// Placement attempts per fish before it is skipped
const PLACEMENT_ATTEMPTS: usize = 100;

/// Columns reserved around a word for the fish sprite and spacing
const FISH_PADDING: usize = 8;

/// Chance of nudging a preferred row up or down
const ROW_JITTER: f64 = 0.3;

const MIN_FISH_SPEED: f64 = 0.003;
const MAX_FISH_SPEED: f64 = 0.010;

const SEAWEED_COLUMNS: usize = 5;
const BUBBLE_STREAMS: usize = 8;

/// Row a bubble restarts from after reaching the surface
const BUBBLE_FLOOR: f64 = 20.0;

/// Fish size, derived from word length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishSize {
    Small,
    Medium,
    Large,
}

impl FishSize {
    pub fn for_word(word: &str) -> Self {
        match word.len() {
            0..=5 => FishSize::Small,
            6..=10 => FishSize::Medium,
            _ => FishSize::Large,
        }
    }

    pub fn sprite(&self) -> &'static str {
        match self {
            FishSize::Small => "><>",
            FishSize::Medium => "><(°>",
            FishSize::Large => "><((°>",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    pub word: String,
    /// Horizontal position in `[0, 1]`
    pub x: f64,
    /// Screen row, margin included
    pub row: usize,
    pub speed: f64,
    /// `1` swims right, `-1` swims left
    pub direction: i8,
    pub size: FishSize,
    pub completed: bool,
    pub completed_at: Option<Instant>,
    pub glowing: bool,
}

impl Fish {
    fn width(&self) -> usize {
        self.word.len() + FISH_PADDING
    }

    fn grid_col(&self) -> usize {
        (self.x * GRID_COLS as f64) as usize
    }

    fn swim(&mut self) {
        self.x += self.speed * f64::from(self.direction);
        if self.x > 1.0 {
            self.x -= 1.0;
        } else if self.x < 0.0 {
            self.x += 1.0;
        }
    }

    fn glow_expired(&self, glow: Duration, now: Instant) -> bool {
        match self.completed_at {
            Some(at) => now.saturating_duration_since(at) > glow,
            None => false,
        }
    }
}

/// A column of rising bubbles
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleStream {
    pub x: usize,
    pub y: f64,
    pub speed: f64,
}

/// Row occupancy used while placing new fish
struct Occupancy {
    cells: [[bool; GRID_COLS]; FISH_ROWS],
    row_counts: [usize; FISH_ROWS],
}

impl Occupancy {
    fn new() -> Self {
        Self {
            cells: [[false; GRID_COLS]; FISH_ROWS],
            row_counts: [0; FISH_ROWS],
        }
    }

    fn can_place(&self, col: usize, row: usize, width: usize) -> bool {
        if row >= FISH_ROWS || col + width > GRID_COLS {
            return false;
        }
        self.cells[row][col..col + width].iter().all(|c| !c)
    }

    fn mark(&mut self, col: usize, row: usize, width: usize) {
        if row >= FISH_ROWS {
            return;
        }
        let end = (col + width).min(GRID_COLS);
        for cell in self.cells[row].iter_mut().take(end).skip(col) {
            *cell = true;
        }
        self.row_counts[row] += 1;
    }

    /// First row holding the fewest fish
    fn emptiest_row(&self) -> usize {
        let mut best = 0;
        for row in 1..FISH_ROWS {
            if self.row_counts[row] < self.row_counts[best] {
                best = row;
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct UnderwaterState {
    fishes: Vec<Fish>,
    started_at: Instant,
    duration: Duration,
    population: usize,
    glow: Duration,
    background_frame: u64,
    seaweed: Vec<usize>,
    bubbles: Vec<BubbleStream>,
}

impl UnderwaterState {
    /// Fill the sea with the configured population
    pub fn new<R: Rng>(settings: &UnderwaterSettings, pool: &WordPool, rng: &mut R, now: Instant) -> Self {
        let bubbles = (0..BUBBLE_STREAMS)
            .map(|i| BubbleStream {
                x: 5 + i * 9,
                y: rng.random_range(0.0..BUBBLE_FLOOR),
                speed: rng.random_range(0.08..0.12),
            })
            .collect();

        let mut state = Self {
            fishes: Vec::new(),
            started_at: now,
            duration: settings.duration,
            population: settings.population,
            glow: settings.glow,
            background_frame: 0,
            seaweed: (0..SEAWEED_COLUMNS).map(|i| 10 + i * 15).collect(),
            bubbles,
        };
        state.replenish(pool, rng);
        state
    }

    pub fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub fn background_frame(&self) -> u64 {
        self.background_frame
    }

    pub fn seaweed(&self) -> &[usize] {
        &self.seaweed
    }

    pub fn bubbles(&self) -> &[BubbleStream] {
        &self.bubbles
    }

    /// Spawn up to `count` fish without overlapping the uncompleted ones.
    ///
    /// A fish that cannot be placed within the attempt budget is skipped, so
    /// fewer than `count` may appear.
    pub fn spawn_fishes<R: Rng>(&mut self, count: usize, pool: &WordPool, rng: &mut R) -> usize {
        let mut grid = Occupancy::new();
        for fish in self.fishes.iter().filter(|f| !f.completed) {
            if let Some(row) = fish.row.checked_sub(TOP_MARGIN) {
                grid.mark(fish.grid_col(), row, fish.width());
            }
        }

        let mut spawned = 0;
        for _ in 0..count {
            let Some(word) = pool.pick_any(rng) else {
                break;
            };
            if let Some(fish) = place_fish(word, &mut grid, rng) {
                self.fishes.push(fish);
                spawned += 1;
            }
        }
        spawned
    }

    /// Top up to the target population
    fn replenish<R: Rng>(&mut self, pool: &WordPool, rng: &mut R) {
        if self.fishes.len() < self.population {
            let missing = self.population - self.fishes.len();
            self.spawn_fishes(missing, pool, rng);
        }
    }

    /// One simulation step: expire glowing fish, move the rest, refill
    pub fn step<R: Rng>(&mut self, now: Instant, pool: &WordPool, rng: &mut R) {
        let glow = self.glow;
        self.fishes
            .retain(|f| !(f.completed && f.glow_expired(glow, now)));

        for fish in self.fishes.iter_mut().filter(|f| !f.completed) {
            fish.swim();
        }

        self.replenish(pool, rng);
    }

    /// Advance the decorative background by one frame
    pub fn animate_background(&mut self) {
        self.background_frame += 1;
        for bubble in &mut self.bubbles {
            bubble.y -= bubble.speed;
            if bubble.y < 0.0 {
                bubble.y = BUBBLE_FLOOR;
            }
        }
    }

    /// Whether some uncaught fish's word starts with `input`
    pub fn has_prefix_match(&self, input: &str) -> bool {
        !input.is_empty()
            && self
                .fishes
                .iter()
                .any(|f| !f.completed && f.word.starts_with(input))
    }

    /// Catch the first uncaught fish whose word equals `input`.
    ///
    /// Returns the length of the caught word.
    pub fn try_capture(&mut self, input: &str, now: Instant) -> Option<usize> {
        if input.is_empty() {
            return None;
        }
        let fish = self
            .fishes
            .iter_mut()
            .find(|f| !f.completed && f.word == input)?;
        fish.completed = true;
        fish.completed_at = Some(now);
        fish.glowing = true;
        Some(fish.word.len())
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    pub fn is_over(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    /// Push the countdown back by a paused interval
    pub fn postpone(&mut self, by: Duration) {
        self.started_at += by;
        for at in self.fishes.iter_mut().filter_map(|f| f.completed_at.as_mut()) {
            *at += by;
        }
    }
}

fn place_fish<R: Rng>(word: &str, grid: &mut Occupancy, rng: &mut R) -> Option<Fish> {
    let width = word.len() + FISH_PADDING;

    for attempt in 0..PLACEMENT_ATTEMPTS {
        let row = if attempt < PLACEMENT_ATTEMPTS / 2 {
            let mut row = grid.emptiest_row();
            if rng.random_bool(ROW_JITTER) && row > 0 {
                row -= 1;
            } else if rng.random_bool(ROW_JITTER) && row < FISH_ROWS - 1 {
                row += 1;
            }
            row
        } else {
            rng.random_range(0..FISH_ROWS)
        };

        let x: f64 = rng.random();
        let col = (x * GRID_COLS as f64) as usize;
        if !grid.can_place(col, row, width) {
            continue;
        }

        grid.mark(col, row, width);
        return Some(Fish {
            word: word.to_string(),
            x,
            row: row + TOP_MARGIN,
            speed: rng.random_range(MIN_FISH_SPEED..MAX_FISH_SPEED),
            direction: if rng.random_bool(0.5) { 1 } else { -1 },
            size: FishSize::for_word(word),
            completed: false,
            completed_at: None,
            glowing: false,
        });
    }
    None
}
