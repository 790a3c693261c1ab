//! Terminal UI components using ratatui

mod ocean;
mod terminal;
mod ui;

pub use terminal::Tui;
pub use ui::render;
