//! Resolution error types
//!
//! Every error names the module(s) it concerns so a caller can point at the
//! descriptor to fix. None of these are transient; nothing is retried.

use modplan_descriptor::{TargetType, Visibility};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Per-module target gating failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Module '{module}' is restricted to {required} targets but the build target is {actual}")]
    UnsupportedTargetType {
        module: Arc<str>,
        required: TargetType,
        actual: TargetType,
    },
}

/// Failures found while merging resolved modules into one graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Module '{module}' lists '{dependency}' as both a {first} and a {second} dependency")]
    ConflictingDependencyVisibility {
        module: Arc<str>,
        dependency: Arc<str>,
        first: Visibility,
        second: Visibility,
    },

    #[error("Cyclic dependency: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<Arc<str>> },

    #[error("Module '{referenced_by}' depends on unknown module '{missing}'")]
    UnknownModule {
        missing: Arc<str>,
        referenced_by: Arc<str>,
    },

    #[error("Module '{0}' was supplied to the assembler more than once")]
    DuplicateModule(Arc<str>),
}

/// Stable machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    UnsupportedTargetType,
    ConflictingDependencyVisibility,
    CyclicDependency,
    UnknownModule,
    DuplicateModule,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedTargetType => "unsupported-target-type",
            ErrorKind::ConflictingDependencyVisibility => "conflicting-dependency-visibility",
            ErrorKind::CyclicDependency => "cyclic-dependency",
            ErrorKind::UnknownModule => "unknown-module",
            ErrorKind::DuplicateModule => "duplicate-module",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any error a resolution pass can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Validation(ValidationError::UnsupportedTargetType { .. }) => {
                ErrorKind::UnsupportedTargetType
            }
            ResolveError::Assembly(err) => err.kind(),
        }
    }

    /// The module whose descriptor has to change
    pub fn module(&self) -> &str {
        match self {
            ResolveError::Validation(ValidationError::UnsupportedTargetType { module, .. }) => {
                module.as_ref()
            }
            ResolveError::Assembly(err) => err.module(),
        }
    }
}

impl AssemblyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssemblyError::ConflictingDependencyVisibility { .. } => {
                ErrorKind::ConflictingDependencyVisibility
            }
            AssemblyError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            AssemblyError::UnknownModule { .. } => ErrorKind::UnknownModule,
            AssemblyError::DuplicateModule(_) => ErrorKind::DuplicateModule,
        }
    }

    /// The module whose descriptor has to change; for a cycle, its first member
    pub fn module(&self) -> &str {
        match self {
            AssemblyError::ConflictingDependencyVisibility { module, .. } => module.as_ref(),
            AssemblyError::CyclicDependency { path } => path.first().map_or("", |m| m.as_ref()),
            AssemblyError::UnknownModule { referenced_by, .. } => referenced_by.as_ref(),
            AssemblyError::DuplicateModule(name) => name.as_ref(),
        }
    }
}

/// Every blocking error found by one resolution pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Module resolution failed with {} error(s)", .errors.len())]
pub struct PlanError {
    pub errors: Vec<ResolveError>,
}

impl PlanError {
    pub fn new(errors: Vec<ResolveError>) -> Self {
        PlanError { errors }
    }

    pub fn single(error: impl Into<ResolveError>) -> Self {
        PlanError {
            errors: vec![error.into()],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolveError> {
        self.errors.iter()
    }
}
