//! Input event handling.
//!
//! Routes decoded keys by mode (browsing the tabs or editing the entry
//! line), runs planned commands and applies what background workers
//! send back.

mod command;
mod edit;
mod event;
mod keys;
mod refresh;
mod search;

pub use event::{handle_event, tick};
pub use refresh::{after_draw, start_cycle};
