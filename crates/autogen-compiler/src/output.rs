//! Writing generated files to disk.

use std::path::Path;

use crate::codegen::GeneratedCode;
use crate::diagnostic::GeneratorError;

/// What a write pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    /// Files already on disk with identical contents.
    pub unchanged: usize,
}

/// Writes every generated file under `out_dir`.
///
/// Files whose contents already match are left untouched. The first I/O
/// failure aborts the pass.
pub fn write_output(out_dir: &Path, generated: &GeneratedCode) -> Result<WriteSummary, GeneratorError> {
    std::fs::create_dir_all(out_dir).map_err(|e| GeneratorError::io(out_dir, e.to_string()))?;

    let mut summary = WriteSummary::default();
    for file in &generated.files {
        let path = out_dir.join(&file.path);

        if let Ok(existing) = std::fs::read_to_string(&path) {
            if existing == file.content {
                tracing::debug!(path = %path.display(), "unchanged");
                summary.unchanged += 1;
                continue;
            }
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e.to_string()))?;
        }
        std::fs::write(&path, &file.content).map_err(|e| GeneratorError::io(&path, e.to_string()))?;
        summary.written += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use crate::codegen::GeneratedFile;

    fn code(content: &str) -> GeneratedCode {
        GeneratedCode {
            files: vec![GeneratedFile {
                path: PathBuf::from("com/app/request/UserApiRequest.kt"),
                content: content.to_string(),
            }],
        }
    }

    #[test]
    fn test_writes_then_skips_unchanged() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("generated");

        let first = write_output(&out, &code("object A\n")).unwrap();
        assert_eq!(first, WriteSummary { written: 1, unchanged: 0 });
        assert_eq!(
            fs::read_to_string(out.join("com/app/request/UserApiRequest.kt")).unwrap(),
            "object A\n"
        );

        let second = write_output(&out, &code("object A\n")).unwrap();
        assert_eq!(second, WriteSummary { written: 0, unchanged: 1 });

        let third = write_output(&out, &code("object B\n")).unwrap();
        assert_eq!(third, WriteSummary { written: 1, unchanged: 0 });
    }

    #[test]
    fn test_unwritable_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A file where the output directory should be.
        let blocked = dir.path().join("out");
        fs::write(&blocked, "not a directory").unwrap();

        let err = write_output(&blocked, &code("object A\n")).unwrap_err();
        assert!(matches!(err, GeneratorError::IoError { .. }));
    }
}
