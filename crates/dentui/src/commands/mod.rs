//! Slash commands typed into the entry line.
//!
//! - Registry: command specs and metadata (registry.rs)
//! - Parsing: alias expansion and typo correction (parse.rs)
//! - Execution: argument resolution and API jobs (exec/)
//!
//! Text that does not name a command is posted as a notice.

mod exec;
mod parse;
mod registry;

pub use exec::{
    compose_job, plan, plan_post, CommandContext, Job, LocalCommand, Outcome, Plan, PostPolicy,
};
pub use parse::{parse_input, ParseContext, Parsed};
pub use registry::{command_help_lines, command_names};
