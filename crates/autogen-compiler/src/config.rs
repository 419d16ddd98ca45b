//! Generator configuration.
//!
//! [`GeneratorConfig`] says where to read and write. [`Conventions`] names every
//! runtime symbol the generated Kotlin refers to, so projects with a different
//! base library only need an `autogen.json` next to their sources.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::diagnostic::GeneratorError;

/// File name picked up by [`Conventions::discover`].
pub const CONVENTIONS_FILE_NAME: &str = "autogen.json";

/// Configuration for a generation pass.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory containing annotated interface sources.
    pub source_dir: PathBuf,

    /// Directory the generated Kotlin tree is written under.
    pub out_dir: PathBuf,

    /// Source language (default: "kotlin").
    pub language: String,

    /// Runtime symbol names and naming rules.
    pub conventions: Conventions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src/main/java"),
            out_dir: PathBuf::from("build/generated/source/autogen"),
            language: "kotlin".to_string(),
            conventions: Conventions::default(),
        }
    }
}

/// Symbol names and naming rules shared by the collector, the extractor and
/// the emitters.
///
/// All type names are fully qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Conventions {
    /// Marker annotation that triggers generation.
    pub autogen_annotation: String,
    /// Per-method marker that disables composition.
    pub close_scheduler_annotation: String,
    /// Per-method deprecation marker translated into `@Deprecated`.
    pub deprecated_api_annotation: String,

    /// Reactive stream type whose presence enables composition.
    pub stream_type: String,
    /// Response wrapper that selects result handling over plain scheduling.
    pub base_response: String,

    /// Superclass of every generated repository.
    pub base_repository: String,
    /// Request helper singleton type.
    pub request_helper: String,
    /// Static factory on the request helper.
    pub request_helper_factory: String,
    /// Service creation entry point on the request helper.
    pub create_service: String,

    /// Field holding the request helper inside a generated request object.
    pub helper_field: String,
    /// Field holding the created service inside a generated request object.
    pub service_field: String,

    /// Method used to attach a composition operator (`compose`).
    pub compose_method: String,
    /// Operator that only applies schedulers.
    pub apply_schedulers: String,
    /// Operator that unwraps the response wrapper.
    pub handle_result: String,

    pub request_sub_package: String,
    pub request_suffix: String,
    pub repository_sub_package: String,
    pub repository_suffix: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            autogen_annotation: "com.github.annotation.Autogen".to_string(),
            close_scheduler_annotation: "com.github.annotation.CloseScheduler".to_string(),
            deprecated_api_annotation: "com.github.annotation.DeprecatedApi".to_string(),
            stream_type: "io.reactivex.Observable".to_string(),
            base_response: "com.baselib.model.response.BaseResponse".to_string(),
            base_repository: "com.baselib.model.repository.AbsRepository".to_string(),
            request_helper: "com.baselib.model.http.ApiRequestHelper".to_string(),
            request_helper_factory: "getInstance".to_string(),
            create_service: "createService".to_string(),
            helper_field: "apiRequestHelper".to_string(),
            service_field: "apiService".to_string(),
            compose_method: "compose".to_string(),
            apply_schedulers: "applySchedulers".to_string(),
            handle_result: "handleResult".to_string(),
            request_sub_package: "request".to_string(),
            request_suffix: "Request".to_string(),
            repository_sub_package: "repository".to_string(),
            repository_suffix: "Repository".to_string(),
        }
    }
}

impl Conventions {
    /// Loads conventions from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| GeneratorError::InvalidConventions {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `autogen.json` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, GeneratorError> {
        let path = dir.join(CONVENTIONS_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading conventions");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Qualified names of every type the conventions refer to.
    ///
    /// Frontends seed their symbol tables with these so star imports of the
    /// runtime packages resolve.
    pub fn known_types(&self) -> Vec<&str> {
        vec![
            self.autogen_annotation.as_str(),
            self.close_scheduler_annotation.as_str(),
            self.deprecated_api_annotation.as_str(),
            self.stream_type.as_str(),
            self.base_response.as_str(),
            self.base_repository.as_str(),
            self.request_helper.as_str(),
        ]
    }

    /// Serializes the conventions as pretty JSON, the format [`Conventions::load`] reads.
    pub fn to_json(&self) -> String {
        // Plain strings only; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
