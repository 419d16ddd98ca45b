//! Language-neutral declarations handed over by a frontend.
//!
//! This is the symbol information a host compiler would supply: what a
//! declaration is, where it lives, which annotations it carries and the
//! signatures of its methods. The descriptor frontend deserializes it
//! directly, so field names here are part of the JSON format.

use serde::{Deserialize, Serialize};

use crate::diagnostic::Span;
use super::types::{simple_name, TypeRef};

/// Kind of a top-level or nested declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface,
    Class,
    Object,
    Enum,
    AnnotationClass,
    TypeAlias,
    Function,
    Property,
}

/// A named declaration with its annotations and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Outer declarations, outermost first, for nested declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enclosing: Vec<String>,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Packages the declaring file imports with `*`. Names that stayed
    /// unresolved may come from any of them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub star_imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Span>,
}

impl Declaration {
    /// Finds the first annotation matching a qualified annotation name.
    pub fn annotation(&self, qualified: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.matches(qualified))
    }

    /// Iterates over the method members in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Property { .. } => None,
        })
    }

    /// `pkg.Outer.Name`.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.namespace.is_empty() {
            parts.push(&self.namespace);
        }
        parts.extend(self.enclosing.iter().map(String::as_str));
        parts.push(&self.name);
        parts.join(".")
    }
}

/// A member of a class-like declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Method(MethodDecl),
    Property { name: String },
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

/// A method signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// Type parameters exactly as written, bounds included (`T : Any`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default = "TypeRef::unit")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_suspend: bool,
}

impl MethodDecl {
    pub fn annotation(&self, qualified: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.matches(qualified))
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub vararg: bool,
}

/// An annotation use: `@Autogen(host = "https://api.example.com")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Name as written (`Autogen`, `com.github.annotation.Autogen`).
    pub name: String,
    /// Fully qualified name, when resolvable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified: Option<String>,
    #[serde(default)]
    pub arguments: Vec<AnnotationArgument>,
}

impl Annotation {
    /// Whether this annotation is the one named by `qualified`.
    ///
    /// Resolved annotations compare qualified names. Unresolved ones fall back
    /// to the simple name so a missing import does not silently disable
    /// generation.
    pub fn matches(&self, qualified: &str) -> bool {
        match &self.qualified {
            Some(resolved) => resolved == qualified,
            None => self.name == qualified || simple_name(&self.name) == simple_name(qualified),
        }
    }

    /// Looks up an argument by name, falling back to its position.
    ///
    /// Positional lookup only considers leading unnamed arguments, matching
    /// Kotlin's rule that positional arguments precede named ones.
    pub fn argument(&self, name: &str, position: usize) -> Option<&AnnotationValue> {
        if let Some(arg) = self.arguments.iter().find(|a| a.name.as_deref() == Some(name)) {
            return Some(&arg.value);
        }
        self.arguments
            .iter()
            .take_while(|a| a.name.is_none())
            .nth(position)
            .map(|a| &a.value)
    }
}

/// A single annotation argument, optionally named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationArgument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: AnnotationValue,
}

/// Annotation argument values the generator understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
    String(String),
    /// An enum constant or other dotted reference: `DeprecationLevel.ERROR`.
    Enum(String),
    /// A nested annotation such as `ReplaceWith("newCall()")`.
    Annotation(Annotation),
    Array(Vec<AnnotationValue>),
    /// Any other expression, kept as source text.
    Other(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }
}
