//! Application event types.
//!
//! Defines the event enum used for communication between the input
//! thread (raw bytes), the refresh timer, background fetch/command
//! workers, and the main event loop.
//!
//! Events are sent via an mpsc channel and processed sequentially
//! in the main loop, which owns all tab and session state.

use crate::api::ApiError;
use crate::commands::Outcome;
use crate::refresh::FetchResult;

#[derive(Debug)]
pub enum AppEvent {
    /// Bytes read from the terminal in raw mode.
    RawInput(Vec<u8>),
    /// The input thread hit end-of-file.
    InputClosed,
    /// The refresh timer fired.
    RefreshDue,
    /// A batch of timeline fetches finished.
    RefreshComplete {
        results: Vec<FetchResult>,
        /// True when this batch was started by the timer cycle.
        scheduled: bool,
    },
    /// A background command finished.
    CommandDone {
        label: String,
        result: Result<Outcome, ApiError>,
    },
}
