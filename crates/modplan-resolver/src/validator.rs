use modplan_descriptor::{ModuleDescriptor, TargetContext};
use tracing::debug;

use crate::errors::ValidationError;

/// Gate a descriptor on the build target type
///
/// A module restricted to one target type refuses every other target. The
/// caller must stop processing the module when this fails.
pub fn validate(descriptor: &ModuleDescriptor, context: &TargetContext) -> Result<(), ValidationError> {
    match descriptor.target_restriction {
        Some(required) if required != context.target_type => {
            debug!(
                "Module '{}' rejected: requires {} target, building {}",
                descriptor.name, required, context.target_type
            );
            Err(ValidationError::UnsupportedTargetType {
                module: descriptor.name.clone(),
                required,
                actual: context.target_type,
            })
        }
        _ => Ok(()),
    }
}
