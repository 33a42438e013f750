//! Ratatui front-end: a library tab with the sortable, filterable book table
//! and a dashboard tab with collection statistics. All state lives in [`App`];
//! the terminal loop only forwards key presses and redraws.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
