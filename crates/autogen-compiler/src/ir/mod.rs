//! Language-agnostic intermediate representation.
//!
//! Frontends produce a [`SourceSet`] of [`Declaration`]s. The collector and
//! extractor turn the annotated interfaces among them into [`ServiceIR`]s,
//! which the code generator consumes.

mod service;
mod source;
mod types;

pub use service::{
    Deprecation, DeprecationLevel, InterfaceDescriptor, MethodDescriptor, ParameterDescriptor, ServiceIR,
};
pub use source::{
    Annotation, AnnotationArgument, AnnotationValue, Declaration, DeclarationKind, Member, MethodDecl,
    ParameterDecl, Visibility,
};
pub use types::{package_of, simple_name, ReturnShape, TypeDescriptor, TypeRef, Variance, UNIT};

use std::path::PathBuf;

/// Every declaration a frontend found under one source directory.
#[derive(Debug)]
pub struct SourceSet {
    pub declarations: Vec<Declaration>,
    pub source_dir: PathBuf,
}

impl SourceSet {
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            declarations: Vec::new(),
            source_dir,
        }
    }
}
