//! modplan library - expose command modules for testing

pub mod commands;
pub mod common;
pub mod errors;
pub mod report;
pub mod tracing_setup;

pub use common::GlobalOpts;
pub use errors::CliError;
