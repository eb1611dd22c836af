//! EdgeX Core Library
//!
//! Shared types for the EdgeX command-line client: the v1 contract objects
//! exchanged with the platform's microservices, the catalogue of services
//! and their default endpoints, and the common error type.

pub mod contracts;
pub mod error;
pub mod paths;
pub mod routes;
pub mod service;

// Re-export commonly used types
pub use contracts::*;
pub use error::*;
pub use paths::{default_config_dir, default_config_path};
pub use service::{ClientEndpoint, Service};
