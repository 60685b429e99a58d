use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while reading descriptor documents
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk descriptor directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid engine version '{0}': expected MAJOR.MINOR")]
    InvalidVersion(String),

    #[error("Unknown target type '{0}': expected one of editor, game, server, program, client")]
    InvalidTarget(String),

    #[error("Module '{0}' is declared more than once")]
    DuplicateModule(Arc<str>),

    #[error("No descriptor documents found under {}", .0.display())]
    NoDescriptors(PathBuf),
}
