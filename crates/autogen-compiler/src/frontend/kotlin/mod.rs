//! Kotlin frontend.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod to_ir;

use std::path::Path;
use walkdir::WalkDir;

use crate::config::Conventions;
use crate::diagnostic::GeneratorError;
use crate::ir::SourceSet;
use super::Frontend;
use parser::KotlinParser;

/// Kotlin frontend implementation.
pub struct KotlinFrontend {
    parser: KotlinParser,
    conventions: Conventions,
}

impl KotlinFrontend {
    /// Creates a new Kotlin frontend.
    pub fn new(conventions: Conventions) -> Self {
        Self {
            parser: KotlinParser::new(),
            conventions,
        }
    }
}

impl Frontend for KotlinFrontend {
    fn language(&self) -> &str {
        "kotlin"
    }

    fn extensions(&self) -> &[&str] {
        &["kt"]
    }

    fn parse_directory(&mut self, dir: &Path) -> Result<SourceSet, GeneratorError> {
        let mut parsed_files = Vec::new();

        // Discover Kotlin files
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension() else { continue };
            if !self.extensions().contains(&ext.to_string_lossy().as_ref()) {
                continue;
            }

            let source = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
            parsed_files.push(self.parser.parse(&source, path)?);
        }

        tracing::debug!(files = parsed_files.len(), dir = %dir.display(), "parsed kotlin sources");

        // Convert to IR
        Ok(to_ir::to_ir(&parsed_files, dir.to_path_buf(), &self.conventions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_directory_walks_kotlin_files_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("b/SecondApi.kt"), "package b\ninterface SecondApi").unwrap();
        fs::write(dir.path().join("a/FirstApi.kt"), "package a\ninterface FirstApi").unwrap();
        fs::write(dir.path().join("a/notes.txt"), "interface Ignored").unwrap();

        let mut frontend = KotlinFrontend::new(Conventions::default());
        let set = frontend.parse_directory(dir.path()).unwrap();
        let names: Vec<String> = set.declarations.iter().map(|d| d.qualified_name()).collect();
        assert_eq!(names, vec!["a.FirstApi", "b.SecondApi"]);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Broken.kt"), "interface Broken {\n  fun f(x Int)\n}").unwrap();

        let mut frontend = KotlinFrontend::new(Conventions::default());
        let err = frontend.parse_directory(dir.path()).unwrap_err();
        assert!(matches!(err, GeneratorError::SyntaxError { line: 2, .. }));
    }
}
