//! wordfall - a terminal typing game
//!
//! Seven ways to race the keyboard: clear word boards, type sentences, beat
//! the clock, catch fish and dance to the beat.

mod app;
mod config;
mod game;
mod stats;
mod storage;
mod tui;

use anyhow::{Context, Result};
use app::{Action, AppCoordinator};
use config::{Config, DEFAULT_CONFIG_FILE};
use crossterm::event::{self, Event, KeyEventKind};
use game::Game;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use storage::Storage;
use tui::Tui;

/// Display refresh interval
const TICK_RATE: Duration = Duration::from_millis(33);

const LOG_FILE: &str = "wordfall.log";

fn main() -> Result<()> {
    init_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    let pool = config.word_pool().context("failed to load word dictionaries")?;
    let sentences = config.sentences().context("failed to load sentences")?;
    info!(
        "loaded {} words and {} sentences",
        pool.len(),
        sentences.len()
    );

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let game = Game::new(pool, sentences, config.mode_settings(), rng);

    let storage = match Storage::open() {
        Ok(storage) => Some(storage),
        Err(e) => {
            warn!("records disabled: {}", e);
            None
        }
    };

    let mut app = AppCoordinator::new(game, storage);

    let mut terminal = Tui::new().context("failed to open terminal")?;
    terminal.enter().context("failed to set up terminal")?;
    run(&mut terminal, &mut app).context("terminal I/O failed")?;

    // Terminal cleanup happens automatically via Tui::drop
    info!("exiting");
    Ok(())
}

/// Main event loop
fn run(terminal: &mut Tui, app: &mut AppCoordinator) -> std::io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| tui::render(frame, app, Instant::now()))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = Action::from_key(key) {
                        app.handle(action, Instant::now());
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Log to a file in the data directory; stdout belongs to the terminal UI.
///
/// Logging stays off when the file cannot be created.
fn init_logging() {
    let Ok(dir) = Storage::data_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join(LOG_FILE)) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}
