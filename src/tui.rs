//! Interactive terminal front end.

mod app;
mod events;
pub mod models;
mod processing;
mod rendering;

pub use app::App;
pub use events::run_tui;
