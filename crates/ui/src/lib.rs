//! Tickwatch UI - User interface layer
//!
//! This crate provides the terminal front end for the Tickwatch clock.

mod app_window;
pub mod bridge;
pub mod view;

pub use app_window::AppWindow;
pub use bridge::{CommandError, UiCommand, UiUpdate};
pub use view::{ClockFace, ClockPanel, HELP_TEXT};
