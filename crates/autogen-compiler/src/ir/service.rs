//! Work items produced by the collector and extractor.

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::diagnostic::Span;
use super::types::TypeRef;

/// One annotated service interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub simple_name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enclosing: Vec<String>,
    /// Alternate host for the service; empty means the helper's default.
    #[serde(default)]
    pub host: String,
    /// Packages the declaring file imports with `*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub star_imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Span>,
}

impl InterfaceDescriptor {
    /// `pkg.Outer.UserApi`.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.namespace.is_empty() {
            parts.push(&self.namespace);
        }
        parts.extend(self.enclosing.iter().map(String::as_str));
        parts.push(&self.simple_name);
        parts.join(".")
    }

    /// A resolved type reference to the interface itself.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::qualified(&self.qualified_name())
    }

    pub fn origin_file(&self) -> &Path {
        self.origin
            .as_ref()
            .map(|span| span.file.as_path())
            .unwrap_or_else(|| Path::new("<unknown>"))
    }
}

/// Severity of a deprecation, mirroring Kotlin's `DeprecationLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeprecationLevel {
    #[default]
    Warning,
    Error,
    Hidden,
}

impl DeprecationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeprecationLevel::Warning => "WARNING",
            DeprecationLevel::Error => "ERROR",
            DeprecationLevel::Hidden => "HIDDEN",
        }
    }

    /// Parses `ERROR` or `DeprecationLevel.ERROR`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.rsplit('.').next().unwrap_or(text).trim() {
            "WARNING" => Some(DeprecationLevel::Warning),
            "ERROR" => Some(DeprecationLevel::Error),
            "HIDDEN" => Some(DeprecationLevel::Hidden),
            _ => None,
        }
    }
}

/// Contents of a deprecation marker on a service method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    pub message: String,
    pub replace_with: String,
    pub level: DeprecationLevel,
}

/// One parameter of a service method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub vararg: bool,
}

/// One service method, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<Deprecation>,
    #[serde(default)]
    pub scheduler_opt_out: bool,
    #[serde(default)]
    pub is_suspend: bool,
}

/// An interface together with its extracted methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIR {
    pub interface: InterfaceDescriptor,
    pub methods: Vec<MethodDescriptor>,
}
