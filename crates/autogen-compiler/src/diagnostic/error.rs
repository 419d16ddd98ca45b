//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during a generation pass.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("I/O failure on '{}': {message}", path.display())]
    #[diagnostic(code(autogen::io::failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Syntax error in {}:{line}:{column}: {message}", file.display())]
    #[diagnostic(
        code(autogen::parse::syntax_error),
        help("Only the declaration surface of Kotlin files is read; bodies are skipped")
    )]
    SyntaxError {
        message: String,
        file: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Invalid descriptor document '{}': {message}", path.display())]
    #[diagnostic(
        code(autogen::parse::invalid_descriptor),
        help("Descriptor documents look like {{\"declarations\": [{{\"name\": \"UserApi\", \"namespace\": \"com.app.api\", \"kind\": \"interface\", ...}}]}}")
    )]
    InvalidDescriptor {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid conventions file '{}': {message}", path.display())]
    #[diagnostic(
        code(autogen::config::invalid_conventions),
        help("Conventions are a JSON object; every key is optional and falls back to its default")
    )]
    InvalidConventions {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Analysis Errors
    // =========================================================================
    #[error("Two annotated interfaces both generate '{name}'")]
    #[diagnostic(
        code(autogen::analysis::duplicate_generated_name),
        help("Rename one of the interfaces or move it to another package")
    )]
    DuplicateGeneratedName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    // =========================================================================
    // Frontend Errors
    // =========================================================================
    #[error("Unsupported language: {language}")]
    #[diagnostic(
        code(autogen::frontend::unsupported_language),
        help("Supported languages: kotlin, descriptor")
    )]
    UnsupportedLanguage {
        language: String,
    },
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a syntax error at a 1-based line/column.
    pub fn syntax(file: impl Into<PathBuf>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            file: file.into(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_location() {
        let err = GeneratorError::syntax("api/UserApi.kt", 3, 14, "expected ')'");
        assert_eq!(err.to_string(), "Syntax error in api/UserApi.kt:3:14: expected ')'");
    }

    #[test]
    fn duplicate_name_has_stable_code() {
        let err = GeneratorError::DuplicateGeneratedName {
            name: "com.app.request.UserApiRequest".to_string(),
            first: PathBuf::from("a/UserApi.kt"),
            second: PathBuf::from("b/UserApi.kt"),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("autogen::analysis::duplicate_generated_name"));
    }
}
