//! Application state and screen flow

pub mod action;
pub mod screen;

pub use action::Action;
pub use screen::{AppCoordinator, MenuOption, PauseOption, ResultsOption, Screen};
