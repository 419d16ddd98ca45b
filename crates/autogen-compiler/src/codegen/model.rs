//! Structured descriptions of the classes to generate.
//!
//! Emitters build these; only [`super::kotlin`] turns them into text.

use std::collections::BTreeSet;

use crate::ir::{DeprecationLevel, TypeRef};

/// `object` (singleton) or `class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Object,
    Class,
}

/// Declaration modifiers, in the order Kotlin writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Open,
    Suspend,
}

impl Modifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Open => "open",
            Modifier::Suspend => "suspend",
        }
    }
}

/// A generated class.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClassSpec {
    pub package: String,
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: BTreeSet<Modifier>,
    /// Supertype, called with no constructor arguments.
    pub superclass: Option<TypeRef>,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<GeneratedMethodSpec>,
    /// Packages star-imported when a signature names a type that stayed
    /// unresolved, so the name still binds the way it did in the source.
    pub fallback_imports: Vec<String>,
}

/// A `private val` with an initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,
    pub initializer: Expr,
}

/// A generated method with a single-expression body.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMethodSpec {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterSpec>,
    /// `None` leaves the return type to Kotlin's inference.
    pub return_type: Option<TypeRef>,
    pub body: MethodBody,
    pub deprecation: Option<DeprecatedAnnotation>,
    pub modifiers: BTreeSet<Modifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: TypeRef,
    pub vararg: bool,
}

/// A delegating call, optionally followed by a composition operator.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    pub call: Expr,
    pub composition: Option<ComposeOperator>,
}

/// Which runtime behavior a composition selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    ApplySchedulers,
    HandleResult,
}

/// `.compose(handleResult())`: `method` is `compose`, `operator` is `handleResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOperator {
    pub kind: CompositionKind,
    pub method: String,
    pub operator: String,
    /// The stream itself is nullable, so the operator is attached with `?.`.
    pub safe_call: bool,
}

/// Expressions that appear in generated bodies and initializers.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A local name: a parameter or a field.
    Name(String),
    /// A type used as a receiver, such as an `object` or a companion.
    Type(TypeRef),
    /// `receiver.method<T>(arguments)`, or `method(arguments)` without a receiver.
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        /// Explicit type arguments; empty leaves them to inference.
        type_arguments: Vec<String>,
        arguments: Vec<Expr>,
    },
    /// `Type::class.java`.
    ClassLiteral(TypeRef),
    StringLiteral(String),
    /// `*array` in a vararg position.
    Spread(Box<Expr>),
}

impl Expr {
    pub fn call(receiver: Expr, method: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Self::generic_call(receiver, method, Vec::new(), arguments)
    }

    pub fn generic_call(
        receiver: Expr,
        method: impl Into<String>,
        type_arguments: Vec<String>,
        arguments: Vec<Expr>,
    ) -> Self {
        Expr::Call {
            receiver: Some(Box::new(receiver)),
            method: method.into(),
            type_arguments,
            arguments,
        }
    }
}

/// Kotlin's own `@Deprecated(message, ReplaceWith(expression), level)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedAnnotation {
    pub message: String,
    pub replace_with: String,
    pub level: DeprecationLevel,
}
