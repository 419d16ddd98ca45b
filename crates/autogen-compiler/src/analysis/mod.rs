//! From declarations to work items.
//!
//! The collector picks the annotated interfaces out of a [`SourceSet`]; the
//! extractor turns each interface's methods into descriptors.

mod collect;
mod extract;

pub use collect::collect_interfaces;
pub use extract::{extract_deprecation, extract_methods};

use crate::config::Conventions;
use crate::ir::{ServiceIR, SourceSet};

/// Runs the collector and the extractor over a source set.
pub fn analyze(source_set: &SourceSet, conventions: &Conventions) -> Vec<ServiceIR> {
    collect_interfaces(source_set, conventions)
        .into_iter()
        .map(|(interface, declaration)| ServiceIR {
            methods: extract_methods(declaration, conventions),
            interface,
        })
        .collect()
}
