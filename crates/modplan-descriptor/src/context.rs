use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EngineVersion, TargetType};

/// Resolved facts of one build invocation, supplied by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetContext {
    pub target_type: TargetType,
    pub engine_version: EngineVersion,
}

impl TargetContext {
    pub const fn new(target_type: TargetType, engine_version: EngineVersion) -> Self {
        TargetContext {
            target_type,
            engine_version,
        }
    }
}

impl fmt::Display for TargetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} target, engine {}", self.target_type, self.engine_version)
    }
}
