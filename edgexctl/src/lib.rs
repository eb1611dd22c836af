//! edgexctl library
//!
//! This library provides the core functionality for the edgexctl CLI tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::EdgexClient`] which provides
//! programmatic access to the EdgeX v1 REST APIs. Interactive commands are
//! built on [`pager::PagerWriter`] for output and
//! [`editor::capture_input_from_editor`] for input.
//!
//! ```no_run
//! use edgexctl::client::EdgexClient;
//! use edgexctl::config::CliConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CliConfig::builder().with_host("edgex.lan")?.build()?;
//! let client = EdgexClient::new(&config)?;
//!
//! let count = client.event_count(None).await?;
//! println!("{} events stored", count.data);
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the EdgeX services.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

/// Interactive input through the user's editor.
pub mod editor;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

/// Command output sink.
pub mod output;

/// Output paging.
pub mod pager;

mod program;

#[cfg(test)]
pub mod test_utils;
