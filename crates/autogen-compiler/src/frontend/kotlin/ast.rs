//! Kotlin-specific AST types.
//!
//! Only the declaration surface is represented. Function bodies, property
//! initializers and default argument values are recognised and skipped.

use std::path::PathBuf;
use crate::diagnostic::Span;
use crate::ir::{DeclarationKind, Variance};

/// A parsed Kotlin file.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub declarations: Vec<ClassDecl>,
}

/// `import a.b.C`, `import a.b.*` or `import a.b.C as D`.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<String>,
    pub wildcard: bool,
    pub span: Span,
}

/// A class-like declaration (interface, class, object, enum, annotation class)
/// or a skipped top-level declaration recorded for completeness.
#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub kind: DeclarationKind,
    pub annotations: Vec<AnnotationNode>,
    pub modifiers: Vec<String>,
    pub functions: Vec<FunctionDecl>,
    pub properties: Vec<String>,
    pub nested: Vec<ClassDecl>,
    pub span: Span,
}

/// A function signature.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub annotations: Vec<AnnotationNode>,
    pub modifiers: Vec<String>,
    pub type_parameters: Vec<TypeParameter>,
    /// Receiver type of an extension function.
    pub receiver: Option<TypeNode>,
    pub parameters: Vec<ParameterNode>,
    pub return_type: Option<TypeNode>,
    /// Block or expression body present.
    pub has_body: bool,
    /// Expression body without a declared return type.
    pub expression_body: bool,
    pub span: Span,
}

impl FunctionDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// `reified T : Comparable<T>`.
#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: String,
    /// The full parameter as written, whitespace normalized.
    pub text: String,
}

/// A value parameter.
#[derive(Debug, Clone)]
pub struct ParameterNode {
    pub name: String,
    pub type_node: TypeNode,
    pub vararg: bool,
    pub has_default: bool,
}

/// Type AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// `a.b.Outer.Inner<Args>?`. Arguments belong to the last segment.
    Named {
        segments: Vec<String>,
        arguments: Vec<TypeNode>,
        nullable: bool,
    },

    /// `in T` / `out T`.
    Projection {
        variance: Variance,
        inner: Box<TypeNode>,
    },

    /// `*`.
    Star,

    /// `(A, B) -> C`, `suspend () -> Unit`, kept as source text.
    Function { text: String },
}

/// `@Name(args)`.
#[derive(Debug, Clone)]
pub struct AnnotationNode {
    /// Dotted name as written.
    pub name: String,
    pub arguments: Vec<ArgumentNode>,
    pub span: Span,
}

/// An annotation or call argument.
#[derive(Debug, Clone)]
pub struct ArgumentNode {
    pub name: Option<String>,
    pub value: ValueNode,
}

/// Annotation argument values.
#[derive(Debug, Clone)]
pub enum ValueNode {
    String(String),
    /// Dotted reference such as `DeprecationLevel.ERROR`.
    Reference(String),
    /// `ReplaceWith("x")`, `arrayOf(...)`.
    Call {
        callee: String,
        arguments: Vec<ArgumentNode>,
    },
    /// `[a, b]`.
    Array(Vec<ValueNode>),
    /// Anything else, as normalized source text.
    Other(String),
}
