//! Area switching and UI command dispatch
//!
//! This module replaces DOM callbacks with explicit commands:
//! - `AreaSwitcher` owns the mounted area (Record or Player)
//! - `AppCommand` values are applied to it one at a time
//! - `spawn_dispatcher` runs it on a task behind a `CommandSender`

mod area;
mod command;
mod dispatcher;
mod stats;
mod switcher;

pub use area::Area;
pub use command::{AppCommand, CommandOutcome};
pub use dispatcher::{spawn_dispatcher, CommandSender};
pub use stats::{AppSnapshot, StatusBoard};
pub use switcher::AreaSwitcher;
