//! Interface collector.

use crate::config::Conventions;
use crate::ir::{AnnotationValue, Declaration, DeclarationKind, InterfaceDescriptor, SourceSet};

/// Returns one work item per interface carrying the marker annotation, in
/// source-set order, paired with the declaration it came from.
///
/// Annotated declarations of any other kind are skipped without error.
pub fn collect_interfaces<'a>(
    source_set: &'a SourceSet,
    conventions: &Conventions,
) -> Vec<(InterfaceDescriptor, &'a Declaration)> {
    let mut collected = Vec::new();

    for declaration in &source_set.declarations {
        let Some(marker) = declaration.annotation(&conventions.autogen_annotation) else {
            continue;
        };
        if declaration.kind != DeclarationKind::Interface {
            tracing::debug!(
                declaration = %declaration.qualified_name(),
                kind = ?declaration.kind,
                "skipping annotated declaration that is not an interface"
            );
            continue;
        }

        let host = match marker.argument("host", 0) {
            None => String::new(),
            Some(AnnotationValue::String(host)) => host.clone(),
            Some(other) => {
                tracing::warn!(
                    interface = %declaration.qualified_name(),
                    value = ?other,
                    "ignoring non-string host"
                );
                String::new()
            }
        };

        collected.push((
            InterfaceDescriptor {
                simple_name: declaration.name.clone(),
                namespace: declaration.namespace.clone(),
                enclosing: declaration.enclosing.clone(),
                host,
                star_imports: declaration.star_imports.clone(),
                origin: declaration.origin.clone(),
            },
            declaration,
        ));
    }

    collected
}
