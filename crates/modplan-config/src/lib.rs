//! Persisted defaults for the modplan CLI
//!
//! A small TOML file supplies the default target type, engine version,
//! resolution mode and visibility policy. Command-line flags override it.

pub mod config;
pub mod errors;

pub use config::{Config, Settings, CONFIG_ENV, CONFIG_FILE_NAME, KEYS, POINTER_FILE};
pub use errors::ConfigError;
