//! Descriptor frontend.
//!
//! Reads declarations that a host compiler (or a test) has already resolved,
//! serialized as `{"declarations": [...]}` JSON documents.

use std::path::Path;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::CONVENTIONS_FILE_NAME;
use crate::diagnostic::{GeneratorError, Span};
use crate::ir::{Declaration, SourceSet};
use super::Frontend;

#[derive(Debug, Deserialize)]
struct DescriptorDocument {
    declarations: Vec<Declaration>,
}

/// Descriptor frontend implementation.
#[derive(Debug, Default)]
pub struct DescriptorFrontend;

impl DescriptorFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Parses one descriptor document.
    pub fn parse_document(&self, content: &str, path: &Path) -> Result<Vec<Declaration>, GeneratorError> {
        let document: DescriptorDocument =
            serde_json::from_str(content).map_err(|e| GeneratorError::InvalidDescriptor {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        // Declarations without an origin are attributed to their document.
        Ok(document
            .declarations
            .into_iter()
            .map(|mut decl| {
                if decl.origin.is_none() {
                    decl.origin = Some(Span::new(path.to_path_buf(), 1, 1, 1, 1));
                }
                decl
            })
            .collect())
    }
}

impl Frontend for DescriptorFrontend {
    fn language(&self) -> &str {
        "descriptor"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_directory(&mut self, dir: &Path) -> Result<SourceSet, GeneratorError> {
        let mut source_set = SourceSet::new(dir.to_path_buf());

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.file_name().is_some_and(|n| n == CONVENTIONS_FILE_NAME) {
                continue;
            }
            let Some(ext) = path.extension() else { continue };
            if !self.extensions().contains(&ext.to_string_lossy().as_ref()) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
            source_set.declarations.extend(self.parse_document(&content, path)?);
        }

        Ok(source_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "declarations": [{
            "name": "UserApi",
            "namespace": "com.app.api",
            "kind": "interface",
            "annotations": [{
                "name": "Autogen",
                "qualified": "com.github.annotation.Autogen",
                "arguments": [{ "name": "host", "value": { "kind": "string", "value": "https://api.example.com" } }]
            }],
            "members": [{
                "kind": "method",
                "name": "login",
                "parameters": [{ "name": "name", "type": { "kind": "declared", "name": "String", "qualified": "kotlin.String" } }],
                "return_type": {
                    "kind": "declared",
                    "name": "Observable",
                    "qualified": "io.reactivex.Observable",
                    "arguments": [{ "kind": "declared", "name": "Token", "qualified": "com.app.model.Token" }]
                }
            }]
        }]
    }"#;

    #[test]
    fn test_parse_document() {
        let decls = DescriptorFrontend::new()
            .parse_document(DOCUMENT, Path::new("api.json"))
            .unwrap();
        assert_eq!(decls.len(), 1);
        let api = &decls[0];
        assert_eq!(api.qualified_name(), "com.app.api.UserApi");
        assert_eq!(api.origin.as_ref().map(|s| s.file.as_path()), Some(Path::new("api.json")));
        let login = api.methods().next().unwrap();
        assert_eq!(login.return_type.to_string(), "Observable<Token>");
    }

    #[test]
    fn test_invalid_document() {
        let err = DescriptorFrontend::new()
            .parse_document(r#"{"declarations": [{"name": 3}]}"#, Path::new("bad.json"))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_parse_directory_skips_conventions_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("api.json"), DOCUMENT).unwrap();
        fs::write(dir.path().join(CONVENTIONS_FILE_NAME), r#"{"requestSuffix": "Req"}"#).unwrap();

        let set = DescriptorFrontend::new().parse_directory(dir.path()).unwrap();
        assert_eq!(set.declarations.len(), 1);
    }
}
