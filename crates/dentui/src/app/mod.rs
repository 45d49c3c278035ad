//! Application orchestration and main event loop.
//!
//! This module owns the client lifecycle:
//! - Startup checks (config, credentials, API connection)
//! - Event loop (raw input, refresh timer, background jobs)
//! - State (tabs, editor, search, session)
//! - UI rendering delegation
//!
//! The app is structured around a single `App` struct that holds
//! all state. Events are processed sequentially in the main loop;
//! worker threads only ever talk to it through the event channel.
//!
//! Submodules:
//! - state: App struct and type definitions
//! - runner: main loop and terminal setup
//! - input: key dispatch, editing, commands and refresh handling
//! - render: drawing the regions

mod input;
mod render;
mod runner;
mod state;

use std::io;

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

pub use runner::run;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not connect: {0}")]
    Api(#[from] ApiError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}
