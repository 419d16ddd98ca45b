//! Type references and return-type classification.
//!
//! Classification only needs two capabilities from a type: its raw (erased)
//! identity and its generic arguments. [`TypeDescriptor`] captures exactly
//! that, so [`ReturnShape::classify`] works over any frontend's type model.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::config::Conventions;

/// Kotlin's implicit return type.
pub const UNIT: &str = "kotlin.Unit";

/// Declaration-site or use-site variance of a type projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    In,
    Out,
}

/// A reference to a type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A class, interface or alias reference: `Observable<BaseResponse<Token>>?`.
    Declared {
        /// Name as written in the source (`Observable`, `io.reactivex.Observable`).
        name: String,
        /// Fully qualified name, when the frontend could resolve it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualified: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<TypeRef>,
        #[serde(default)]
        nullable: bool,
    },

    /// A type parameter of the enclosing method: `T`.
    Variable {
        name: String,
        #[serde(default)]
        nullable: bool,
    },

    /// A use-site projection inside type arguments: `out T`.
    Projection {
        variance: Variance,
        inner: Box<TypeRef>,
    },

    /// The star projection `*`.
    Star,

    /// Anything the generator passes through verbatim (function types, ...).
    Opaque { text: String },

    /// No type was written and the compiler infers it (`fun f() = ...`).
    Inferred,
}

impl TypeRef {
    /// A resolved declared type without arguments.
    pub fn qualified(qualified: &str) -> Self {
        Self::Declared {
            name: simple_name(qualified).to_string(),
            qualified: Some(qualified.to_string()),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// A resolved declared type with arguments.
    pub fn generic(qualified: &str, arguments: Vec<TypeRef>) -> Self {
        Self::Declared {
            name: simple_name(qualified).to_string(),
            qualified: Some(qualified.to_string()),
            arguments,
            nullable: false,
        }
    }

    /// A declared type the frontend could not resolve.
    pub fn unresolved(name: &str) -> Self {
        Self::Declared {
            name: name.to_string(),
            qualified: None,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// `kotlin.Unit`.
    pub fn unit() -> Self {
        Self::qualified(UNIT)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Declared { qualified: Some(q), nullable: false, .. } if q == UNIT)
    }
}

/// Writes the type the way it appeared in source (no qualification added).
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Declared { name, arguments, nullable, .. } => {
                write!(f, "{}", name)?;
                if !arguments.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                if *nullable {
                    write!(f, "?")?;
                }
                Ok(())
            }
            TypeRef::Variable { name, nullable } => {
                write!(f, "{}{}", name, if *nullable { "?" } else { "" })
            }
            TypeRef::Projection { variance, inner } => match variance {
                Variance::In => write!(f, "in {}", inner),
                Variance::Out => write!(f, "out {}", inner),
            },
            TypeRef::Star => write!(f, "*"),
            TypeRef::Opaque { text } => write!(f, "{}", text),
            TypeRef::Inferred => Ok(()),
        }
    }
}

/// The capability classification needs from a type handle.
pub trait TypeDescriptor: Sized {
    /// Qualified identity of the erased type, if this is a resolved declared type.
    fn raw_type(&self) -> Option<&str>;

    /// Generic arguments in declaration order.
    fn type_arguments(&self) -> &[Self];
}

impl TypeDescriptor for TypeRef {
    fn raw_type(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { qualified, .. } => qualified.as_deref(),
            // `out BaseResponse<T>` erases to `BaseResponse`
            TypeRef::Projection { inner, .. } => inner.raw_type(),
            _ => None,
        }
    }

    fn type_arguments(&self) -> &[Self] {
        match self {
            TypeRef::Declared { arguments, .. } => arguments,
            TypeRef::Projection { inner, .. } => inner.type_arguments(),
            _ => &[],
        }
    }
}

/// How a method's return type drives repository composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// Not the stream type, or not a resolvable declared type at all.
    NotStream,
    /// `Stream<T>` where `T` is not the response wrapper.
    Stream,
    /// `Stream<BaseResponse<..>>`.
    StreamOfResponse,
}

impl ReturnShape {
    /// Classifies a return type against the configured stream and response types.
    pub fn classify<T: TypeDescriptor>(ty: &T, conventions: &Conventions) -> Self {
        match ty.raw_type() {
            Some(raw) if raw == conventions.stream_type => match ty.type_arguments() {
                [argument] if argument.raw_type() == Some(conventions.base_response.as_str()) => {
                    ReturnShape::StreamOfResponse
                }
                _ => ReturnShape::Stream,
            },
            _ => ReturnShape::NotStream,
        }
    }
}

/// Last dot-separated segment of a (possibly) qualified name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Everything before the last dot, or `""` for a simple name.
pub fn package_of(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) => &qualified[..idx],
        None => "",
    }
}
