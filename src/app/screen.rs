//! Application screen state management
//!
//! Handles transitions between different application screens:
//! - Welcome menu
//! - About
//! - Mode selection
//! - Playing (running, paused and results)
//! - Error

use log::{info, warn};
use std::time::Instant;

use super::action::Action;
use crate::game::{Game, GameMode, GameStatus};
use crate::storage::{now_millis, RunRecord, Storage};

/// Game logic runs on every n-th display tick
pub const TICKS_PER_STEP: u64 = 3;

/// Runs listed on the about screen
const HISTORY_LEN: usize = 5;

/// Menu option on the welcome screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Start,
    About,
    Quit,
}

impl MenuOption {
    /// Get all menu options in order
    pub fn all() -> &'static [MenuOption] {
        &[MenuOption::Start, MenuOption::About, MenuOption::Quit]
    }

    /// Get the display label for this option
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Start => "Start",
            MenuOption::About => "About",
            MenuOption::Quit => "Quit",
        }
    }
}

/// Pause menu entries, indexed by `Game::pause_menu_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOption {
    Resume,
    Restart,
    SelectMode,
    MainMenu,
}

impl PauseOption {
    pub fn all() -> &'static [PauseOption] {
        &[
            PauseOption::Resume,
            PauseOption::Restart,
            PauseOption::SelectMode,
            PauseOption::MainMenu,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PauseOption::Resume => "Resume",
            PauseOption::Restart => "Restart",
            PauseOption::SelectMode => "Select Mode",
            PauseOption::MainMenu => "Main Menu",
        }
    }
}

/// Results menu entries, indexed by `Game::results_menu_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsOption {
    Restart,
    SelectMode,
    MainMenu,
}

impl ResultsOption {
    pub fn all() -> &'static [ResultsOption] {
        &[
            ResultsOption::Restart,
            ResultsOption::SelectMode,
            ResultsOption::MainMenu,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultsOption::Restart => "Restart",
            ResultsOption::SelectMode => "Select Mode",
            ResultsOption::MainMenu => "Main Menu",
        }
    }
}

/// The current application screen
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Welcome menu
    Welcome { selected: usize },
    /// About the game, with recent runs
    About,
    /// Choosing a mode
    ModeSelect { selected: usize },
    /// A session exists; the game status decides what is shown
    Playing,
    /// A mode failed to start
    Error { message: String },
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Whether the application should quit
    pub should_quit: bool,
    game: Game,
    storage: Option<Storage>,
    /// Best speed run time known for the current session
    best_time: Option<f64>,
    new_record: bool,
    session_recorded: bool,
    history: Vec<RunRecord>,
    ticks: u64,
}

impl AppCoordinator {
    /// Create a new app coordinator starting at the welcome menu
    pub fn new(game: Game, storage: Option<Storage>) -> Self {
        Self {
            screen: Screen::Welcome { selected: 0 },
            should_quit: false,
            game,
            storage,
            best_time: None,
            new_record: false,
            session_recorded: false,
            history: Vec::new(),
            ticks: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Stored speed run best time, in seconds
    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    /// Whether the last finished speed run set a new record
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    /// Recent runs loaded when the about screen was opened
    pub fn history(&self) -> &[RunRecord] {
        &self.history
    }

    /// Quit the application
    pub fn quit(&mut self, now: Instant) {
        if self.screen == Screen::Playing {
            self.leave_session(now);
        }
        self.should_quit = true;
    }

    /// Dispatch one input action
    pub fn handle(&mut self, action: Action, now: Instant) {
        if action == Action::Quit {
            self.quit(now);
            return;
        }

        match self.screen.clone() {
            Screen::Welcome { selected } => self.handle_welcome(action, selected, now),
            Screen::About => {
                if matches!(action, Action::Back | Action::Confirm) {
                    self.go_to_menu();
                }
            }
            Screen::ModeSelect { selected } => self.handle_mode_select(action, selected, now),
            Screen::Playing => self.handle_playing(action, now),
            Screen::Error { .. } => {
                if matches!(action, Action::Back | Action::Confirm) {
                    self.go_to_menu();
                }
            }
        }
        self.record_if_finished(now);
    }

    /// Display tick (~33ms); the simulation steps every few ticks
    pub fn on_tick(&mut self, now: Instant) {
        self.ticks += 1;
        if self.screen != Screen::Playing {
            return;
        }
        if self.ticks % TICKS_PER_STEP == 0 {
            self.game.tick(now);
        } else {
            self.game.check_timeouts(now);
        }
        self.record_if_finished(now);
    }

    /// Go back to the welcome menu
    pub fn go_to_menu(&mut self) {
        self.screen = Screen::Welcome { selected: 0 };
    }

    fn go_to_mode_select(&mut self) {
        self.screen = Screen::ModeSelect { selected: 0 };
    }

    fn handle_welcome(&mut self, action: Action, selected: usize, now: Instant) {
        let count = MenuOption::all().len();
        if let Some(delta) = menu_step(action) {
            self.screen = Screen::Welcome {
                selected: wrap_index(selected, delta, count),
            };
            return;
        }

        match action {
            Action::Confirm => match MenuOption::all()[selected.min(count - 1)] {
                MenuOption::Start => self.go_to_mode_select(),
                MenuOption::About => self.open_about(),
                MenuOption::Quit => self.quit(now),
            },
            Action::Back => self.quit(now),
            _ => {}
        }
    }

    fn open_about(&mut self) {
        if let Some(storage) = &self.storage {
            match storage.recent_runs(HISTORY_LEN) {
                Ok(runs) => self.history = runs,
                Err(e) => warn!("could not load run history: {}", e),
            }
        }
        self.screen = Screen::About;
    }

    fn handle_mode_select(&mut self, action: Action, selected: usize, now: Instant) {
        let modes = GameMode::all();
        if let Some(delta) = menu_step(action) {
            self.screen = Screen::ModeSelect {
                selected: wrap_index(selected, delta, modes.len()),
            };
            return;
        }

        match action {
            Action::Confirm => self.start_mode(modes[selected.min(modes.len() - 1)], now),
            Action::Char(c) => {
                let index = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
                if let Some(mode) = index.and_then(|i| modes.get(i)) {
                    self.start_mode(*mode, now);
                }
            }
            Action::Back => self.go_to_menu(),
            _ => {}
        }
    }

    fn handle_playing(&mut self, action: Action, now: Instant) {
        match self.game.status() {
            GameStatus::Running => match action {
                Action::Char(' ') if self.game.mode() == Some(GameMode::RhythmDance) => {
                    self.game.try_rhythm_judgment(now);
                }
                Action::Char(c) => self.game.add_char(c, now),
                Action::Backspace => self.game.backspace(),
                Action::Confirm => self.game.try_eliminate(now),
                Action::Back => self.game.pause(now),
                _ => {}
            },
            GameStatus::Paused => match action {
                Action::Navigate(delta) => self.game.move_pause_menu(delta),
                Action::Back => self.game.resume(now),
                Action::Confirm => {
                    let index = self.game.pause_menu_index();
                    match PauseOption::all().get(index) {
                        Some(PauseOption::Resume) => self.game.resume(now),
                        Some(PauseOption::Restart) => self.restart(now),
                        Some(PauseOption::SelectMode) => {
                            self.leave_session(now);
                            self.go_to_mode_select();
                        }
                        Some(PauseOption::MainMenu) => {
                            self.leave_session(now);
                            self.go_to_menu();
                        }
                        None => {}
                    }
                }
                _ => {}
            },
            GameStatus::Finished => match action {
                Action::Navigate(delta) => self.game.move_results_menu(delta),
                Action::Back => self.go_to_mode_select(),
                Action::Confirm => {
                    let index = self.game.results_menu_index();
                    match ResultsOption::all().get(index) {
                        Some(ResultsOption::Restart) => self.restart(now),
                        Some(ResultsOption::SelectMode) => self.go_to_mode_select(),
                        Some(ResultsOption::MainMenu) => self.go_to_menu(),
                        None => {}
                    }
                }
                _ => {}
            },
            GameStatus::Idle => self.go_to_menu(),
        }
    }

    fn restart(&mut self, now: Instant) {
        if let Some(mode) = self.game.mode() {
            self.leave_session(now);
            self.start_mode(mode, now);
        }
    }

    /// Start a session; a failed start lands on the error screen
    pub fn start_mode(&mut self, mode: GameMode, now: Instant) {
        match self.game.start(mode, now) {
            Ok(()) => {
                self.session_recorded = false;
                self.new_record = false;
                self.best_time = if mode == GameMode::SpeedRun {
                    self.load_best_time(mode)
                } else {
                    None
                };
                self.screen = Screen::Playing;
            }
            Err(e) => {
                warn!("could not start {} mode: {}", mode.label(), e);
                self.screen = Screen::Error {
                    message: format!("Could not start {} mode: {}", mode.label(), e),
                };
            }
        }
    }

    fn load_best_time(&self, mode: GameMode) -> Option<f64> {
        let storage = self.storage.as_ref()?;
        match storage.best_time(mode.key()) {
            Ok(best) => best,
            Err(e) => {
                warn!("could not read best time: {}", e);
                None
            }
        }
    }

    /// End an unfinished session as aborted so it is kept in the history
    fn leave_session(&mut self, now: Instant) {
        if self.game.status() == GameStatus::Paused {
            self.game.resume(now);
        }
        self.game.abort(now);
        self.record_if_finished(now);
    }

    /// Persist a finished session once
    fn record_if_finished(&mut self, now: Instant) {
        if self.game.status() != GameStatus::Finished || self.session_recorded {
            return;
        }
        self.session_recorded = true;
        let Some(mode) = self.game.mode() else {
            return;
        };

        let stats = self.game.stats();
        let score = match self.game.rhythm_dance() {
            Some(state) => i64::from(state.total_score()),
            None => i64::from(stats.words_completed()),
        };
        let run = RunRecord {
            mode: mode.key().to_string(),
            aborted: self.game.is_aborted(),
            elapsed: stats.elapsed_seconds(now),
            words: stats.words_completed(),
            letters: stats.total_letters(),
            accuracy: stats.accuracy_percent(),
            score,
            finished_at: now_millis(),
        };

        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.append_run(&run) {
            warn!("could not save run: {}", e);
        }

        if mode == GameMode::SpeedRun && !run.aborted {
            match storage.record_best_time(mode.key(), run.elapsed) {
                Ok(true) => {
                    info!("new speed run record: {:.3}s", run.elapsed);
                    self.best_time = Some(run.elapsed);
                    self.new_record = true;
                }
                Ok(false) => {}
                Err(e) => warn!("could not save best time: {}", e),
            }
        }
    }
}

/// Menu movement for arrow keys and vi-style j/k
fn menu_step(action: Action) -> Option<i32> {
    match action {
        Action::Navigate(delta) => Some(delta),
        Action::Char('k') => Some(-1),
        Action::Char('j') => Some(1),
        _ => None,
    }
}

fn wrap_index(current: usize, delta: i32, len: usize) -> usize {
    let len = len as i64;
    (current as i64 + i64::from(delta)).rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::settings::ModeSettings;
    use crate::game::words::{TierRatios, WordPool};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn game(words: &[&str], settings: ModeSettings) -> Game {
        let pool = WordPool::new(
            words.iter().map(|w| w.to_string()).collect(),
            Vec::new(),
            Vec::new(),
            TierRatios::default(),
        );
        Game::new(pool, vec!["hi".to_string()], settings, StdRng::seed_from_u64(1))
    }

    fn speed_run_app() -> AppCoordinator {
        let mut settings = ModeSettings::default();
        settings.speed_run_words = 1;
        AppCoordinator::new(game(&["go"], settings), Some(Storage::open_in_memory().unwrap()))
    }

    fn type_and_submit(app: &mut AppCoordinator, word: &str, now: Instant) {
        for c in word.chars() {
            app.handle(Action::Char(c), now);
        }
        app.handle(Action::Confirm, now);
    }

    fn stored_best(app: &AppCoordinator) -> Option<f64> {
        app.storage.as_ref().unwrap().best_time("speed_run").unwrap()
    }

    #[test]
    fn test_welcome_navigation_wraps() {
        let mut app = AppCoordinator::new(game(&["go"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Navigate(-1), t0);
        assert_eq!(app.screen, Screen::Welcome { selected: 2 });
        app.handle(Action::Char('j'), t0);
        assert_eq!(app.screen, Screen::Welcome { selected: 0 });
    }

    #[test]
    fn test_welcome_to_about_and_back() {
        let mut app = AppCoordinator::new(game(&["go"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Navigate(1), t0);
        app.handle(Action::Confirm, t0);
        assert_eq!(app.screen, Screen::About);
        app.handle(Action::Back, t0);
        assert_eq!(app.screen, Screen::Welcome { selected: 0 });
    }

    #[test]
    fn test_welcome_quit() {
        let mut app = AppCoordinator::new(game(&["go"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Navigate(2), t0);
        app.handle(Action::Confirm, t0);
        assert!(app.should_quit);
    }

    #[test]
    fn test_mode_select_wraps_and_starts() {
        let mut app = AppCoordinator::new(game(&["go", "cat"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Confirm, t0);
        assert_eq!(app.screen, Screen::ModeSelect { selected: 0 });

        app.handle(Action::Navigate(-1), t0);
        assert_eq!(app.screen, Screen::ModeSelect { selected: 6 });
        app.handle(Action::Navigate(1), t0);
        app.handle(Action::Navigate(1), t0);
        app.handle(Action::Confirm, t0);

        assert_eq!(app.screen, Screen::Playing);
        assert_eq!(app.game().mode(), Some(GameMode::Sentence));
    }

    #[test]
    fn test_digit_selects_mode() {
        let mut app = AppCoordinator::new(game(&["go", "cat"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Confirm, t0);
        app.handle(Action::Char('3'), t0);
        assert_eq!(app.game().mode(), Some(GameMode::Countdown));
    }

    #[test]
    fn test_failed_start_shows_error() {
        let mut app = AppCoordinator::new(game(&[], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.handle(Action::Confirm, t0);
        app.handle(Action::Char('1'), t0);
        assert!(matches!(app.screen, Screen::Error { .. }));

        app.handle(Action::Confirm, t0);
        assert_eq!(app.screen, Screen::Welcome { selected: 0 });
    }

    #[test]
    fn test_speed_run_best_time_persisted() {
        let mut app = speed_run_app();
        let t0 = Instant::now();
        app.start_mode(GameMode::SpeedRun, t0);
        assert_eq!(app.best_time(), None);

        type_and_submit(&mut app, "go", t0 + Duration::from_secs(2));
        assert_eq!(app.game().status(), GameStatus::Finished);
        assert!(!app.game().is_aborted());
        assert_eq!(stored_best(&app), Some(2.0));
        assert!(app.is_new_record());

        // Restart from the results menu; a slower run keeps the record
        let t1 = t0 + Duration::from_secs(10);
        app.handle(Action::Confirm, t1);
        assert_eq!(app.game().status(), GameStatus::Running);
        assert_eq!(app.best_time(), Some(2.0));
        type_and_submit(&mut app, "go", t1 + Duration::from_secs(3));
        assert_eq!(stored_best(&app), Some(2.0));
        assert!(!app.is_new_record());

        // A faster run replaces it
        let t2 = t0 + Duration::from_secs(20);
        app.handle(Action::Confirm, t2);
        type_and_submit(&mut app, "go", t2 + Duration::from_secs(1));
        assert_eq!(stored_best(&app), Some(1.0));
        assert_eq!(app.best_time(), Some(1.0));
    }

    #[test]
    fn test_each_session_recorded_once() {
        let mut app = speed_run_app();
        let t0 = Instant::now();
        app.start_mode(GameMode::SpeedRun, t0);
        type_and_submit(&mut app, "go", t0 + Duration::from_secs(2));
        app.on_tick(t0 + Duration::from_secs(3));
        app.handle(Action::Navigate(1), t0 + Duration::from_secs(3));

        let runs = app.storage.as_ref().unwrap().recent_runs(10).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].mode, "speed_run");
        assert_eq!(runs[0].words, 1);
    }

    #[test]
    fn test_pause_menu_main_menu_records_aborted_run() {
        let mut app = speed_run_app();
        let t0 = Instant::now();
        app.start_mode(GameMode::SpeedRun, t0);
        app.handle(Action::Back, t0);
        assert_eq!(app.game().status(), GameStatus::Paused);

        app.handle(Action::Navigate(3), t0);
        app.handle(Action::Confirm, t0);
        assert_eq!(app.screen, Screen::Welcome { selected: 0 });

        let runs = app.storage.as_ref().unwrap().recent_runs(10).unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].aborted);
        assert_eq!(stored_best(&app), None);
    }

    #[test]
    fn test_pause_and_resume_via_back() {
        let mut app = speed_run_app();
        let t0 = Instant::now();
        app.start_mode(GameMode::SpeedRun, t0);
        app.handle(Action::Back, t0);
        app.handle(Action::Char('g'), t0);
        assert_eq!(app.game().input(), "");

        app.handle(Action::Back, t0);
        assert_eq!(app.game().status(), GameStatus::Running);
        app.handle(Action::Char('g'), t0);
        assert_eq!(app.game().input(), "g");
    }

    #[test]
    fn test_quit_while_playing_aborts() {
        let mut app = speed_run_app();
        let t0 = Instant::now();
        app.start_mode(GameMode::SpeedRun, t0);
        app.handle(Action::Quit, t0);
        assert!(app.should_quit);
        assert!(app.game().is_aborted());
    }

    #[test]
    fn test_tick_finishes_countdown() {
        let mut settings = ModeSettings::default();
        settings.countdown.duration = Duration::from_secs(1);
        let mut app = AppCoordinator::new(game(&["go", "cat"], settings), None);
        let t0 = Instant::now();
        app.start_mode(GameMode::Countdown, t0);

        app.on_tick(t0 + Duration::from_millis(500));
        assert_eq!(app.game().status(), GameStatus::Running);
        app.on_tick(t0 + Duration::from_millis(1033));
        assert_eq!(app.game().status(), GameStatus::Finished);
    }

    #[test]
    fn test_space_judges_in_rhythm_dance() {
        let mut app = AppCoordinator::new(game(&["go", "cat", "sun"], ModeSettings::default()), None);
        let t0 = Instant::now();
        app.start_mode(GameMode::RhythmDance, t0);
        app.handle(Action::Char(' '), t0);
        let state = app.game().rhythm_dance().unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(app.game().input(), "");
    }
}
