//! UI rendering using ratatui
//!
//! Supports multiple screens:
//! - Welcome: main menu
//! - About: rules and recent runs
//! - ModeSelect: the seven game modes
//! - Playing: in-game view, pause overlay and results
//! - Error: error message display

use std::time::{Duration, Instant};

use super::ocean::OceanWidget;
use crate::app::{AppCoordinator, MenuOption, PauseOption, ResultsOption, Screen};
use crate::game::rhythm::{cell_of, Judgment, RhythmDanceState, BAR_WIDTH, CURRENT_SLOT};
use crate::game::modes::ModeState;
use crate::game::{Game, GameMode, GameStatus};
use crate::storage::RunRecord;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};

/// How long an eliminated word stays visible, struck through
const FADE: Duration = Duration::from_millis(300);

/// How long a judgment label stays on screen
const JUDGMENT_FLASH: Duration = Duration::from_millis(600);

/// Judgments listed on the rhythm dance results
const RECENT_JUDGMENTS: usize = 10;

const LOGO: &str = r#"
                             _  __       _ _
 __      _____  _ __ __| |/ _| __ _| | |
 \ \ /\ / / _ \| '__/ _` | |_ / _` | | |
  \ V  V / (_) | | | (_| |  _| (_| | | |
   \_/\_/ \___/|_|  \__,_|_|  \__,_|_|_|
"#;

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, app: &AppCoordinator, now: Instant) {
    match &app.screen {
        Screen::Welcome { selected } => render_welcome(frame, *selected),
        Screen::About => render_about(frame, app.history()),
        Screen::ModeSelect { selected } => render_mode_select(frame, *selected),
        Screen::Playing => render_playing(frame, app, now),
        Screen::Error { message } => render_error(frame, message),
    }
}

/// Cursor-marked list of menu labels
fn menu_items<'a>(labels: impl Iterator<Item = &'a str>, selected: usize) -> Vec<ListItem<'a>> {
    labels
        .enumerate()
        .map(|(i, label)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, label)).style(style)
        })
        .collect()
}

fn footer(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_welcome(frame: &mut Frame, selected: usize) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Logo
            Constraint::Length(2), // Tagline
            Constraint::Min(4),    // Menu options
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(frame.area());

    let logo = Paragraph::new(LOGO).style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(logo, centered(layout[0], 42, 7));

    let tagline = Paragraph::new("Type the words before they type you.")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(tagline, layout[1]);

    let labels = MenuOption::all().iter().map(|opt| opt.label());
    let menu_area = centered(layout[2], 20, MenuOption::all().len() as u16);
    frame.render_widget(List::new(menu_items(labels, selected)), menu_area);

    footer(frame, layout[3], "↑↓ Navigate  Enter Select  Esc Quit");
}

fn render_about(frame: &mut Frame, history: &[RunRecord]) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Rules
            Constraint::Min(4),    // Recent runs
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(frame.area());

    let rules = vec![
        Line::from("wordfall - a terminal typing game").bold(),
        Line::from(""),
        Line::from("Type a word shown on screen and press Enter to eliminate it."),
        Line::from("Words that start with your input are highlighted."),
        Line::from("Rhythm Dance: press Enter or Space as the pointer crosses the gold mark."),
        Line::from("Esc pauses a game. Ctrl+C quits at any time."),
    ];
    let rules = Paragraph::new(rules)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("About"));
    frame.render_widget(rules, layout[0]);

    let items: Vec<ListItem> = if history.is_empty() {
        vec![ListItem::new("No runs yet").style(Style::default().fg(Color::DarkGray))]
    } else {
        history
            .iter()
            .map(|run| {
                let mark = if run.aborted { " (aborted)" } else { "" };
                ListItem::new(format!(
                    "{:<14} {:>4} words  {:>7.2}s  {:>5.1}%  score {}{}",
                    run.mode, run.words, run.elapsed, run.accuracy, run.score, mark
                ))
            })
            .collect()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Recent runs"));
    frame.render_widget(list, layout[1]);

    footer(frame, layout[2], "Esc Back");
}

fn render_mode_select(frame: &mut Frame, selected: usize) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(9),    // Modes
            Constraint::Length(3), // Description
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(frame.area());

    let header = Paragraph::new("Select a mode")
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, layout[0]);

    let modes = GameMode::all();
    let labels: Vec<String> = modes
        .iter()
        .enumerate()
        .map(|(i, mode)| format!("{}. {}", i + 1, mode.label()))
        .collect();
    let list = List::new(menu_items(labels.iter().map(String::as_str), selected));
    frame.render_widget(list, centered(layout[1], 24, modes.len() as u16));

    if let Some(mode) = modes.get(selected) {
        let description = Paragraph::new(mode.description())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(description, layout[2]);
    }

    footer(frame, layout[3], "↑↓ Navigate  1-7 Quick start  Enter Select  Esc Back");
}

fn render_playing(frame: &mut Frame, app: &AppCoordinator, now: Instant) {
    let game = app.game();
    let Some(mode) = game.mode() else {
        return;
    };

    if game.status() == GameStatus::Finished {
        render_results(frame, app, mode, now);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Mode view
            Constraint::Length(3), // Input
        ])
        .split(frame.area());

    render_header(frame, layout[0], app, mode, now);

    match mode {
        GameMode::Sentence => render_sentence(frame, layout[1], game),
        GameMode::UnderwaterCountdown => {
            if let Some(state) = game.underwater() {
                frame.render_widget(OceanWidget::new(state, game.input()), layout[1]);
            }
        }
        GameMode::RhythmDance => {
            if let Some(state) = game.rhythm_dance() {
                render_rhythm_dance(frame, layout[1], state, now);
            }
        }
        GameMode::RhythmMaster => render_rhythm_master(frame, layout[1], game, now),
        GameMode::Classic | GameMode::Countdown | GameMode::SpeedRun => {
            render_word_grid(frame, layout[1], game, now)
        }
    }

    let input = Paragraph::new(format!("> {}_", game.input()))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(input, layout[2]);

    if game.status() == GameStatus::Paused {
        render_pause_menu(frame, game.pause_menu_index());
    }
}

/// Render the header: logo, mode status, clock
fn render_header(frame: &mut Frame, area: Rect, app: &AppCoordinator, mode: GameMode, now: Instant) {
    let game = app.game();
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Logo
            Constraint::Min(20),    // Mode status
            Constraint::Length(12), // Clock
        ])
        .split(inner);

    let logo = Paragraph::new("wordfall").style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(logo, header_layout[0]);

    let words = game.stats().words_completed();
    let status = match mode {
        GameMode::Classic => format!("{} | {} left", mode.label(), game.active_words().len()),
        GameMode::Sentence => {
            let total = game.target_sentence().map_or(0, |s| s.chars().count());
            format!("{} | {}/{}", mode.label(), game.input().chars().count(), total)
        }
        GameMode::Countdown => format!("{} | {} words", mode.label(), words),
        GameMode::SpeedRun => {
            let best = app
                .best_time()
                .map_or_else(|| "-".to_string(), |b| format!("{:.2}s", b));
            let target = match game.round() {
                Some(ModeState::SpeedRun(round)) => round.target_words(),
                _ => 0,
            };
            format!(
                "{} | {}/{} | best {}",
                mode.label(),
                words,
                target,
                best
            )
        }
        GameMode::RhythmMaster => match game.rhythm_master() {
            Some(round) => format!(
                "{} | level {} | streak {}",
                mode.label(),
                round.level() + 1,
                round.streak()
            ),
            None => mode.label().to_string(),
        },
        GameMode::UnderwaterCountdown => format!("{} | {} caught", mode.label(), words),
        GameMode::RhythmDance => match game.rhythm_dance() {
            Some(state) => format!(
                "{} | score {} | combo {} | {} words",
                mode.label(),
                state.total_score(),
                state.combo(),
                state.completed_words()
            ),
            None => mode.label().to_string(),
        },
    };
    let status = Paragraph::new(status)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(status, header_layout[1]);

    let (clock, color) = match (game.remaining_time(now), game.speed_run_time(now)) {
        (Some(left), _) => (format_clock(left), countdown_color(left)),
        (None, Some(run)) => (format!("{:.1}s", run.as_secs_f64()), Color::Cyan),
        (None, None) => (format_clock(game.stats().elapsed(now)), Color::Green),
    };
    let clock = Paragraph::new(clock)
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Right);
    frame.render_widget(clock, header_layout[2]);
}

/// Words as a wrapped paragraph; matches show the typed prefix
fn render_word_grid(frame: &mut Frame, area: Rect, game: &Game, now: Instant) {
    let matched = game.matched_indices();
    let typed = game.input().len();

    let mut spans: Vec<Span> = Vec::new();
    for (i, word) in game.words().iter().enumerate() {
        if word.completed {
            let fading = word
                .completed_at
                .is_some_and(|at| now.saturating_duration_since(at) < FADE);
            if fading {
                spans.push(Span::styled(
                    word.text.as_str(),
                    Style::default().fg(Color::DarkGray).crossed_out(),
                ));
                spans.push(Span::raw("   "));
            }
            continue;
        }

        if matched.contains(&i) {
            let (done, rest) = word.text.split_at(typed.min(word.text.len()));
            spans.push(Span::styled(done, Style::default().fg(Color::Green).bold()));
            spans.push(Span::styled(rest, Style::default().fg(Color::Yellow)));
        } else {
            spans.push(Span::styled(word.text.as_str(), Style::default().fg(Color::White)));
        }
        spans.push(Span::raw("   "));
    }

    let grid = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::NONE))
        .alignment(Alignment::Left);
    frame.render_widget(grid, inner_margin(area));
}

fn render_rhythm_master(frame: &mut Frame, area: Rect, game: &Game, now: Instant) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    if let (Some(round), Some(left)) = (game.rhythm_master(), game.word_time_remaining(now)) {
        let limit = round.time_limit().as_secs_f64();
        let ratio = if limit > 0.0 {
            (left.as_secs_f64() / limit).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Word timer"))
            .gauge_style(Style::default().fg(countdown_color(left * 30)))
            .ratio(ratio)
            .label(format!("{:.1}s / {:.1}s", left.as_secs_f64(), limit));
        frame.render_widget(gauge, layout[0]);
    }

    render_word_grid(frame, layout[1], game, now);
}

/// Target sentence with per-character correctness
fn render_sentence(frame: &mut Frame, area: Rect, game: &Game) {
    let Some(target) = game.target_sentence() else {
        return;
    };
    let typed: Vec<char> = game.input().chars().collect();

    let mut spans: Vec<Span> = Vec::new();
    for (i, expected) in target.chars().enumerate() {
        let style = match typed.get(i) {
            Some(got) if *got == expected => Style::default().fg(Color::Green),
            Some(_) => Style::default().fg(Color::White).bg(Color::Red),
            None if i == typed.len() => Style::default().fg(Color::Black).bg(Color::Gray),
            None => Style::default().fg(Color::DarkGray),
        };
        spans.push(Span::styled(expected.to_string(), style));
    }
    // overflow beyond the target is always wrong
    for extra in typed.iter().skip(target.chars().count()) {
        spans.push(Span::styled(
            extra.to_string(),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }

    let sentence = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Type this"));
    frame.render_widget(sentence, inner_margin(area));
}

fn render_rhythm_dance(frame: &mut Frame, area: Rect, state: &RhythmDanceState, now: Instant) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Word queue
            Constraint::Length(3), // Rhythm bar
            Constraint::Length(1), // Judgment
            Constraint::Min(3),    // Dancer
        ])
        .margin(1)
        .split(area);

    let queue: Vec<Span> = state
        .queue()
        .iter()
        .enumerate()
        .flat_map(|(slot, word)| {
            let style = match slot.cmp(&CURRENT_SLOT) {
                std::cmp::Ordering::Less => Style::default().fg(Color::DarkGray),
                std::cmp::Ordering::Equal => Style::default().fg(Color::Yellow).bold().underlined(),
                std::cmp::Ordering::Greater => Style::default().fg(Color::White),
            };
            [Span::styled(word.as_str(), style), Span::raw("   ")]
        })
        .collect();
    let queue = Paragraph::new(Line::from(queue))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(queue, layout[0]);

    let bar = Paragraph::new(rhythm_bar(state))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Beat"));
    frame.render_widget(bar, centered(layout[1], BAR_WIDTH as u16 + 2, 3));

    if let Some(last) = state.last_judgment() {
        if now.saturating_duration_since(last.at) < JUDGMENT_FLASH {
            let label = Paragraph::new(last.judgment.label())
                .style(Style::default().fg(judgment_color(last.judgment)).bold())
                .alignment(Alignment::Center);
            frame.render_widget(label, layout[2]);
        }
    }

    let dancer_color = match state.last_judgment() {
        Some(last) if now.saturating_duration_since(last.at) < JUDGMENT_FLASH => {
            judgment_color(last.judgment)
        }
        _ => Color::White,
    };
    let dancer = Paragraph::new(state.animation().frame())
        .style(Style::default().fg(dancer_color))
        .alignment(Alignment::Center);
    frame.render_widget(dancer, layout[3]);
}

/// One line of bar cells with the golden mark and the pointer
fn rhythm_bar(state: &RhythmDanceState) -> Line<'static> {
    let last = BAR_WIDTH - 1;
    let golden = cell_of(state.golden_ratio()).min(last);
    let pointer = cell_of(state.pointer_position()).min(last);

    let spans: Vec<Span> = (0..BAR_WIDTH)
        .map(|cell| {
            if cell == pointer {
                let color = if cell == golden { Color::Green } else { Color::Cyan };
                Span::styled("█", Style::default().fg(color))
            } else if cell == golden {
                Span::styled("|", Style::default().fg(Color::Yellow).bold())
            } else {
                Span::styled("─", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    Line::from(spans)
}

fn render_pause_menu(frame: &mut Frame, selected: usize) {
    let options = PauseOption::all();
    let area = centered(frame.area(), 26, options.len() as u16 + 2);
    frame.render_widget(Clear, area);

    let labels = options.iter().map(|opt| opt.label());
    let menu = List::new(menu_items(labels, selected)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title("Paused"),
    );
    frame.render_widget(menu, area);
}

/// Session summary with the results menu
fn render_results(frame: &mut Frame, app: &AppCoordinator, mode: GameMode, now: Instant) {
    let game = app.game();
    let stats = game.stats();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(8),    // Summary
            Constraint::Length(ResultsOption::all().len() as u16 + 2),
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(frame.area());

    let (title, color) = if game.is_aborted() {
        (format!("{} - ABORTED", mode.label()), Color::Red)
    } else {
        (format!("{} - FINISHED", mode.label()), Color::Green)
    };
    let title = Paragraph::new(title)
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[0]);

    let mut lines = vec![
        Line::from(format!("Time:        {:.2}s", stats.elapsed_seconds(now))),
        Line::from(format!("Words:       {}", stats.words_completed())),
        Line::from(format!("Letters:     {}", stats.total_letters())),
        Line::from(format!("Letters/s:   {:.2}", stats.letters_per_second(now))),
        Line::from(format!("Words/s:     {:.2}", stats.words_per_second(now))),
        Line::from(format!("Accuracy:    {:.1}%", stats.accuracy_percent())),
        Line::from(format!(
            "Keystrokes:  {} ({} on track)",
            stats.total_keystrokes(),
            stats.valid_keystrokes()
        )),
        Line::from(format!("Correct:     {}", stats.correct_chars())),
    ];

    if mode == GameMode::SpeedRun {
        if let Some(best) = app.best_time() {
            lines.push(Line::from(format!("Best time:   {:.2}s", best)));
        }
        if app.is_new_record() {
            lines.push(Line::from("NEW RECORD!").style(Style::default().fg(Color::Yellow).bold()));
        }
    }
    if let Some(round) = game.rhythm_master() {
        lines.push(Line::from(format!("Level:       {}", round.level() + 1)));
    }
    if let Some(state) = game.rhythm_dance() {
        let counts = state.counts();
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Score:       {}", state.total_score())));
        lines.push(Line::from(format!("Max combo:   {}", state.max_combo())));
        lines.push(Line::from(vec![
            Span::styled(format!("Perfect {}  ", counts.perfect), judgment_style(Judgment::Perfect)),
            Span::styled(format!("Nice {}  ", counts.nice), judgment_style(Judgment::Nice)),
            Span::styled(format!("OK {}  ", counts.ok), judgment_style(Judgment::Ok)),
            Span::styled(format!("Miss {}", counts.miss), judgment_style(Judgment::Miss)),
        ]));
        lines.push(recent_judgments(state.history()));
    }

    let summary = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Results"));
    frame.render_widget(summary, centered(layout[1], 48, layout[1].height));

    let labels = ResultsOption::all().iter().map(|opt| opt.label());
    let menu = List::new(menu_items(labels, game.results_menu_index()))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(menu, centered(layout[2], 24, layout[2].height));

    footer(frame, layout[3], "↑↓ Navigate  Enter Select");
}

/// Render error screen
fn render_error(frame: &mut Frame, message: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Percentage(40),
        ])
        .margin(2)
        .split(frame.area());

    let error = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error, layout[1]);

    footer(frame, layout[2], "Press Esc to go back");
}

/// The last few judgments as colored initials, oldest first
fn recent_judgments(history: &[Judgment]) -> Line<'static> {
    let start = history.len().saturating_sub(RECENT_JUDGMENTS);
    let mut spans = vec![Span::raw("Recent:      ")];
    spans.extend(history[start..].iter().map(|&judgment| {
        let initial = judgment.label().chars().next().unwrap_or('?');
        Span::styled(initial.to_string(), judgment_style(judgment))
    }));
    Line::from(spans)
}

fn judgment_color(judgment: Judgment) -> Color {
    match judgment {
        Judgment::Perfect => Color::Magenta,
        Judgment::Nice => Color::Green,
        Judgment::Ok => Color::Yellow,
        Judgment::Miss => Color::Red,
    }
}

fn judgment_style(judgment: Judgment) -> Style {
    Style::default().fg(judgment_color(judgment))
}

fn countdown_color(left: Duration) -> Color {
    if left <= Duration::from_secs(10) {
        Color::Red
    } else if left <= Duration::from_secs(30) {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Format a duration as m:ss
fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// A `width` x `height` rect centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn inner_margin(area: Rect) -> Rect {
    area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    })
}
