//! Generated-name collision detection.
//!
//! Naming is a textual substitution, so `a.UserApi` and `a.Outer.UserApi`
//! both map to `a.request.UserApiRequest`. Writing both would let one
//! silently overwrite the other.

use std::collections::HashMap;
use std::path::Path;

use crate::codegen::naming;
use crate::config::Conventions;
use crate::diagnostic::GeneratorError;
use crate::ir::ServiceIR;

/// Fails on the first generated class name claimed by two interfaces.
pub fn validate_generated_names(services: &[ServiceIR], conventions: &Conventions) -> Result<(), GeneratorError> {
    let mut claimed: HashMap<String, &Path> = HashMap::new();

    for service in services {
        let interface = &service.interface;
        for name in [
            naming::request_name(interface, conventions),
            naming::repository_name(interface, conventions),
        ] {
            let qualified = name.qualified();
            if let Some(first) = claimed.get(&qualified) {
                return Err(GeneratorError::DuplicateGeneratedName {
                    name: qualified,
                    first: first.to_path_buf(),
                    second: interface.origin_file().to_path_buf(),
                });
            }
            claimed.insert(qualified, interface.origin_file());
        }
    }

    Ok(())
}
