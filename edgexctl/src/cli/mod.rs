//! CLI command definitions and handlers
//!
//! - [`commands`] holds the clap argument and subcommand types
//! - [`handlers`] runs each command against an [`crate::client::EdgexClient`]
//!   and writes the result to an [`crate::output::Output`]

mod commands;
mod handlers;

pub use commands::*;
pub use handlers::*;
