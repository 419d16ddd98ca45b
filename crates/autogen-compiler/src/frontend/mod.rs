//! Language frontends for reading declarations into IR.
//!
//! Each frontend is responsible for:
//! 1. Reading source files in its format
//! 2. Resolving written names to qualified ones where it can
//!
//! Everything after the frontend works on [`SourceSet`] alone, so the
//! collector, extractor and emitters are shared.

pub mod descriptor;
pub mod kotlin;

use std::path::Path;
use crate::config::Conventions;
use crate::diagnostic::GeneratorError;
use crate::ir::SourceSet;

/// Trait for language frontends.
pub trait Frontend {
    /// Returns the language name (e.g., "kotlin", "descriptor").
    fn language(&self) -> &str;

    /// Returns file extensions this frontend handles (e.g., ["kt"]).
    fn extensions(&self) -> &[&str];

    /// Reads all source files in the given directory.
    fn parse_directory(&mut self, dir: &Path) -> Result<SourceSet, GeneratorError>;
}

/// Creates a frontend for the given language.
pub fn create_frontend(language: &str, conventions: &Conventions) -> Result<Box<dyn Frontend>, GeneratorError> {
    match language {
        "kotlin" | "kt" => Ok(Box::new(kotlin::KotlinFrontend::new(conventions.clone()))),
        "descriptor" | "json" => Ok(Box::new(descriptor::DescriptorFrontend::new())),
        _ => Err(GeneratorError::UnsupportedLanguage {
            language: language.to_string(),
        }),
    }
}
