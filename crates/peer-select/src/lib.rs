//! peer-select library: Exposes internal modules for testing.
//!
//! This is a thin library layer over the CLI components,
//! allowing integration tests to access internal types.

pub mod cli;
pub mod config;
pub mod http;

// Re-export key types for convenience
pub use cli::{Cli, Command, QueryArgs, RegistryArg};
pub use config::ClientConfig;
pub use http::{DeviceClient, HttpError, HttpRegistry};
