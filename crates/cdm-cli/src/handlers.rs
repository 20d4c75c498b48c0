//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod api;
mod completions;
mod config;
mod job;
mod utils;

pub use api::{handle_delete, handle_get, handle_patch, handle_post};
pub use completions::handle_completions;
pub use config::handle_config;
pub use job::handle_job_status;
pub use utils::build_client;
