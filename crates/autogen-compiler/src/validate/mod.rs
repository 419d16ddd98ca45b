//! Validation of collected services.

mod collisions;

use crate::config::Conventions;
use crate::diagnostic::GeneratorError;
use crate::ir::ServiceIR;

/// Validates every service before anything is generated.
pub fn validate_services(services: &[ServiceIR], conventions: &Conventions) -> Result<(), GeneratorError> {
    // Generated names must be unique across the pass
    collisions::validate_generated_names(services, conventions)?;

    for service in services {
        if service.methods.is_empty() {
            tracing::warn!(
                interface = %service.interface.qualified_name(),
                "annotated interface has no methods to delegate"
            );
        }
    }

    Ok(())
}
