//! Errors surfaced by the command line

use modplan_config::ConfigError;
use modplan_descriptor::DescriptorError;
use modplan_resolver::PlanError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{}' already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Module '{0}' is not part of the resolved graph")]
    ModuleNotFound(String),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Resolution errors, if this is a failed plan
    pub fn plan_errors(&self) -> Option<&PlanError> {
        match self {
            CliError::Plan(err) => Some(err),
            _ => None,
        }
    }
}
