//! Configuration file model
//!
//! A JSON file where every field is optional. Missing keys take their
//! defaults and a missing file is the same as an empty one.

use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::dictionary::{builtin_sentences, builtin_words};
use crate::game::settings::{
    CountdownSettings, ModeSettings, ReplenishSettings, RhythmDanceSettings, RhythmMasterSettings,
    UnderwaterSettings,
};
use crate::game::words::{load_sentences, load_words, LoadError, Tier, TierRatios, WordPool};

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors that can occur while loading or applying the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read or written
    Io(io::Error),
    /// The file is not valid JSON for this model
    Parse(serde_json::Error),
    /// Values that parse but cannot be used
    InvalidConfiguration(String),
    /// A configured dictionary file could not be loaded
    Dictionary { path: PathBuf, source: LoadError },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {}", e),
            ConfigError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            ConfigError::Dictionary { path, source } => {
                write!(f, "failed to load {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RhythmMasterConfig {
    /// Seconds
    pub initial_time_limit: f64,
    /// Seconds
    pub min_time_limit: f64,
    /// Seconds removed per level
    pub difficulty_step: f64,
    pub words_per_level: u32,
}

impl Default for RhythmMasterConfig {
    fn default() -> Self {
        Self {
            initial_time_limit: 2.0,
            min_time_limit: 0.5,
            difficulty_step: 0.1,
            words_per_level: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RhythmDanceConfig {
    /// Seconds
    pub duration: u64,
    /// Bar fraction per step
    pub initial_speed: f64,
    pub speed_increment: f64,
    pub miss_limit: u32,
}

impl Default for RhythmDanceConfig {
    fn default() -> Self {
        Self {
            duration: 60,
            initial_speed: 0.05,
            speed_increment: 0.005,
            miss_limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnderwaterConfig {
    /// Seconds
    pub duration: u64,
    pub population: usize,
    pub glow_ms: u64,
}

impl Default for UnderwaterConfig {
    fn default() -> Self {
        Self {
            duration: 60,
            population: 10,
            glow_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplenishConfig {
    pub threshold: usize,
    pub batch: usize,
}

impl Default for ReplenishConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            batch: 20,
        }
    }
}

/// Everything the player can tune
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub word_count: usize,
    pub short_dict_path: Option<PathBuf>,
    pub medium_dict_path: Option<PathBuf>,
    pub long_dict_path: Option<PathBuf>,
    pub short_ratio: f64,
    pub medium_ratio: f64,
    pub long_ratio: f64,
    pub sentence_dict_path: Option<PathBuf>,
    /// Seconds
    pub countdown_duration: u64,
    pub speedrun_word_count: usize,
    pub rhythm_master: RhythmMasterConfig,
    pub rhythm_dance: RhythmDanceConfig,
    pub underwater: UnderwaterConfig,
    pub replenish: ReplenishConfig,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_count: 20,
            short_dict_path: None,
            medium_dict_path: None,
            long_dict_path: None,
            short_ratio: 30.0,
            medium_ratio: 50.0,
            long_ratio: 20.0,
            sentence_dict_path: None,
            countdown_duration: 60,
            speedrun_word_count: 25,
            rhythm_master: RhythmMasterConfig::default(),
            rhythm_dance: RhythmDanceConfig::default(),
            underwater: UnderwaterConfig::default(),
            replenish: ReplenishConfig::default(),
            seed: None,
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalized_ratios()?;

        let rm = &self.rhythm_master;
        let times = [rm.initial_time_limit, rm.min_time_limit, rm.difficulty_step];
        if times.iter().any(|t| Duration::try_from_secs_f64(*t).is_err()) {
            return Err(invalid(
                "rhythm_master time values must be non-negative seconds within range",
            ));
        }
        if rm.words_per_level == 0 {
            return Err(invalid("rhythm_master.words_per_level must be at least 1"));
        }
        if rm.min_time_limit > rm.initial_time_limit {
            return Err(invalid(
                "rhythm_master.min_time_limit is above initial_time_limit",
            ));
        }

        let rd = &self.rhythm_dance;
        if !(rd.initial_speed.is_finite() && rd.initial_speed > 0.0) {
            return Err(invalid("rhythm_dance.initial_speed must be positive"));
        }
        if !(rd.speed_increment.is_finite() && rd.speed_increment >= 0.0) {
            return Err(invalid("rhythm_dance.speed_increment must be non-negative"));
        }
        Ok(())
    }

    /// Tier ratios scaled to sum to one
    pub fn normalized_ratios(&self) -> Result<TierRatios, ConfigError> {
        TierRatios::normalize(self.short_ratio, self.medium_ratio, self.long_ratio).ok_or_else(
            || {
                invalid(&format!(
                    "word ratios {}/{}/{} cannot be normalized",
                    self.short_ratio, self.medium_ratio, self.long_ratio
                ))
            },
        )
    }

    /// Per-mode tunables with durations converted from seconds
    pub fn mode_settings(&self) -> ModeSettings {
        let rm = &self.rhythm_master;
        let rd = &self.rhythm_dance;
        let uw = &self.underwater;
        let defaults = ModeSettings::default();
        ModeSettings {
            word_count: self.word_count,
            countdown: CountdownSettings {
                duration: Duration::from_secs(self.countdown_duration),
                initial_words: defaults.countdown.initial_words,
            },
            speed_run_words: self.speedrun_word_count,
            rhythm_master: RhythmMasterSettings {
                initial_time_limit: seconds(rm.initial_time_limit),
                min_time_limit: seconds(rm.min_time_limit),
                difficulty_step: seconds(rm.difficulty_step),
                words_per_level: rm.words_per_level,
                initial_words: defaults.rhythm_master.initial_words,
            },
            underwater: UnderwaterSettings {
                duration: Duration::from_secs(uw.duration),
                population: uw.population,
                glow: Duration::from_millis(uw.glow_ms),
            },
            rhythm_dance: RhythmDanceSettings {
                duration: Duration::from_secs(rd.duration),
                initial_speed: rd.initial_speed,
                speed_increment: rd.speed_increment,
                miss_limit: rd.miss_limit,
            },
            replenish: ReplenishSettings {
                threshold: self.replenish.threshold,
                batch: self.replenish.batch,
            },
        }
    }

    fn dict_path(&self, tier: Tier) -> Option<&Path> {
        match tier {
            Tier::Short => self.short_dict_path.as_deref(),
            Tier::Medium => self.medium_dict_path.as_deref(),
            Tier::Long => self.long_dict_path.as_deref(),
        }
    }

    /// Build the word pool from configured files or the built-in lists.
    ///
    /// A tier whose ratio is zero is left empty.
    pub fn word_pool(&self) -> Result<WordPool, ConfigError> {
        let ratios = self.normalized_ratios()?;
        let mut tiers: [Vec<String>; 3] = Default::default();
        for (slot, tier) in tiers.iter_mut().zip(Tier::all()) {
            if ratios.get(tier) <= 0.0 {
                continue;
            }
            *slot = match self.dict_path(tier) {
                Some(path) => read_file(path, load_words)?,
                None => builtin_words(tier),
            };
        }
        let [short, medium, long] = tiers;
        let pool = WordPool::new(short, medium, long, ratios);
        for tier in Tier::all() {
            debug!("{} tier: {} words", tier.label(), pool.tier(tier).len());
        }
        Ok(pool)
    }

    /// Sentences for sentence mode
    pub fn sentences(&self) -> Result<Vec<String>, ConfigError> {
        match &self.sentence_dict_path {
            Some(path) => read_file(path, load_sentences),
            None => Ok(builtin_sentences()),
        }
    }
}

fn read_file<F>(path: &Path, parse: F) -> Result<Vec<String>, ConfigError>
where
    F: FnOnce(BufReader<File>) -> Result<Vec<String>, LoadError>,
{
    let to_error = |source| ConfigError::Dictionary {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| to_error(LoadError::Io(e)))?;
    parse(BufReader::new(file)).map_err(to_error)
}

/// Out-of-range values saturate; `validate` rejects them up front
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::InvalidConfiguration(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wordfall-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_nested_section() {
        let config: Config =
            serde_json::from_str(r#"{"rhythm_master": {"words_per_level": 5}, "seed": 7}"#).unwrap();
        assert_eq!(config.rhythm_master.words_per_level, 5);
        assert_eq!(config.rhythm_master.initial_time_limit, 2.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(&temp_path("does-not-exist.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_normalized_ratios() {
        let ratios = Config::default().normalized_ratios().unwrap();
        assert!((ratios.short - 0.3).abs() < 1e-9);
        assert!((ratios.medium - 0.5).abs() < 1e-9);
        assert!((ratios.long - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_zero_ratio_sum_is_invalid() {
        let mut config = Config::default();
        config.short_ratio = 0.0;
        config.medium_ratio = 0.0;
        config.long_ratio = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_negative_ratio_is_invalid() {
        let mut config = Config::default();
        config.long_ratio = -1.0;
        assert!(config.normalized_ratios().is_err());
    }

    #[test]
    fn test_rhythm_master_limits_validated() {
        let mut config = Config::default();
        config.rhythm_master.min_time_limit = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rhythm_master.words_per_level = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_time_limit_is_invalid() {
        let mut config = Config::default();
        config.rhythm_master.initial_time_limit = 1e30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration(_))
        ));
        assert_eq!(config.mode_settings().rhythm_master.initial_time_limit, Duration::MAX);

        let mut config = Config::default();
        config.rhythm_master.difficulty_step = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_settings_match_game_defaults() {
        assert_eq!(Config::default().mode_settings(), ModeSettings::default());
    }

    #[test]
    fn test_mode_settings_convert_seconds() {
        let mut config = Config::default();
        config.countdown_duration = 30;
        config.rhythm_master.initial_time_limit = 1.5;
        let settings = config.mode_settings();
        assert_eq!(settings.countdown.duration, Duration::from_secs(30));
        assert_eq!(
            settings.rhythm_master.initial_time_limit,
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_zero_ratio_tier_not_loaded() {
        let mut config = Config::default();
        config.long_ratio = 0.0;
        let pool = config.word_pool().unwrap();
        assert!(pool.tier(Tier::Long).is_empty());
        assert!(!pool.tier(Tier::Short).is_empty());
        assert!(!pool.tier(Tier::Medium).is_empty());
    }

    #[test]
    fn test_dictionary_file_is_loaded() {
        let path = temp_path("short.txt");
        std::fs::write(&path, "Apple\nbad-word\n\nkiwi\n").unwrap();
        let mut config = Config::default();
        config.short_dict_path = Some(path.clone());
        let pool = config.word_pool();
        std::fs::remove_file(&path).unwrap();

        let pool = pool.unwrap();
        assert_eq!(pool.tier(Tier::Short), ["apple".to_string(), "kiwi".to_string()]);
    }

    #[test]
    fn test_missing_dictionary_file_is_error() {
        let mut config = Config::default();
        config.sentence_dict_path = Some(temp_path("no-sentences.txt"));
        assert!(matches!(
            config.sentences(),
            Err(ConfigError::Dictionary { .. })
        ));
    }
}
