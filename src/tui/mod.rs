// tui/mod.rs - Interactive editor

mod app;
mod events;
mod ui;

pub use events::run_tui;
