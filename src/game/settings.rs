//! Per-mode tunables handed to the game at mode start

use std::time::Duration;

/// Countdown mode: fixed session length
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSettings {
    pub duration: Duration,
    pub initial_words: usize,
}

/// Rhythm master mode: per-word time limit that shrinks with level
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmMasterSettings {
    pub initial_time_limit: Duration,
    pub min_time_limit: Duration,
    pub difficulty_step: Duration,
    pub words_per_level: u32,
    pub initial_words: usize,
}

impl RhythmMasterSettings {
    /// Time limit for a given difficulty level, floored at the minimum
    pub fn time_limit_for_level(&self, level: u32) -> Duration {
        self.initial_time_limit
            .saturating_sub(self.difficulty_step.checked_mul(level).unwrap_or(Duration::MAX))
            .max(self.min_time_limit)
    }
}

/// Underwater mode: session length and fish population
#[derive(Debug, Clone, PartialEq)]
pub struct UnderwaterSettings {
    pub duration: Duration,
    pub population: usize,
    /// How long a captured fish glows before it is removed
    pub glow: Duration,
}

/// Rhythm dance mode: pointer speed ramp and ending conditions
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmDanceSettings {
    pub duration: Duration,
    pub initial_speed: f64,
    pub speed_increment: f64,
    pub miss_limit: u32,
}

/// When and how much to top up word lists in endless modes
#[derive(Debug, Clone, PartialEq)]
pub struct ReplenishSettings {
    /// Top up when fewer than this many words remain
    pub threshold: usize,
    /// Words added per top-up
    pub batch: usize,
}

/// Every tunable, one block per mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSettings {
    pub word_count: usize,
    pub countdown: CountdownSettings,
    pub speed_run_words: usize,
    pub rhythm_master: RhythmMasterSettings,
    pub underwater: UnderwaterSettings,
    pub rhythm_dance: RhythmDanceSettings,
    pub replenish: ReplenishSettings,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            word_count: 20,
            countdown: CountdownSettings {
                duration: Duration::from_secs(60),
                initial_words: 30,
            },
            speed_run_words: 25,
            rhythm_master: RhythmMasterSettings {
                initial_time_limit: Duration::from_secs(2),
                min_time_limit: Duration::from_millis(500),
                difficulty_step: Duration::from_millis(100),
                words_per_level: 10,
                initial_words: 50,
            },
            underwater: UnderwaterSettings {
                duration: Duration::from_secs(60),
                population: 10,
                glow: Duration::from_millis(800),
            },
            rhythm_dance: RhythmDanceSettings {
                duration: Duration::from_secs(60),
                initial_speed: 0.05,
                speed_increment: 0.005,
                miss_limit: 10,
            },
            replenish: ReplenishSettings {
                threshold: 10,
                batch: 20,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limit_shrinks_and_floors() {
        let s = ModeSettings::default().rhythm_master;
        assert_eq!(s.time_limit_for_level(0), Duration::from_secs(2));
        assert_eq!(s.time_limit_for_level(3), Duration::from_millis(1700));
        assert_eq!(s.time_limit_for_level(15), Duration::from_millis(500));
        assert_eq!(s.time_limit_for_level(100), Duration::from_millis(500));
    }
}
