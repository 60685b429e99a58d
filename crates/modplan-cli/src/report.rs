//! Rendering of resolution errors for humans and machines

use colored::Colorize;
use modplan_logger as logger;
use modplan_resolver::{ErrorKind, PlanError, ResolveError};
use serde::Serialize;

/// One error in machine-readable form
#[derive(Debug, Serialize)]
pub struct ErrorEntry<'a> {
    pub kind: ErrorKind,
    pub module: &'a str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub errors: Vec<ErrorEntry<'a>>,
}

impl<'a> ErrorReport<'a> {
    pub fn from_plan_error(err: &'a PlanError) -> Self {
        ErrorReport {
            errors: err
                .iter()
                .map(|e| ErrorEntry {
                    kind: e.kind(),
                    module: e.module(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

/// Single-line description of one resolution error
pub fn format_error(err: &ResolveError) -> String {
    format!("[{}] {}", err.kind().as_str().dimmed(), err)
}

/// Log every error of a failed pass followed by a count
pub fn report_plan_error(err: &PlanError) {
    for error in err.iter() {
        logger::error(&format_error(error));
    }
    logger::error(&err.to_string());
}
