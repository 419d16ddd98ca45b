//! Method descriptor extractor.

use crate::config::Conventions;
use crate::ir::{
    Annotation, AnnotationValue, Declaration, Deprecation, DeprecationLevel, MethodDescriptor,
    ParameterDescriptor, Visibility,
};

/// Extracts one descriptor per delegable method of an interface, in
/// declaration order.
pub fn extract_methods(declaration: &Declaration, conventions: &Conventions) -> Vec<MethodDescriptor> {
    declaration
        .methods()
        .filter(|method| {
            let keep = method.visibility != Visibility::Private;
            if !keep {
                tracing::debug!(
                    interface = %declaration.qualified_name(),
                    method = %method.name,
                    "skipping private method"
                );
            }
            keep
        })
        .map(|method| MethodDescriptor {
            name: method.name.clone(),
            type_parameters: method.type_parameters.clone(),
            parameters: method
                .parameters
                .iter()
                .map(|p| ParameterDescriptor {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                    vararg: p.vararg,
                })
                .collect(),
            return_type: method.return_type.clone(),
            deprecation: method
                .annotation(&conventions.deprecated_api_annotation)
                .map(extract_deprecation),
            scheduler_opt_out: method.annotation(&conventions.close_scheduler_annotation).is_some(),
            is_suspend: method.is_suspend,
        })
        .collect()
}

/// Reads `message`, `replaceWith` and `level` from a deprecation marker.
///
/// `replaceWith` may be a `ReplaceWith("expr")` annotation or a plain string.
pub fn extract_deprecation(marker: &Annotation) -> Deprecation {
    let message = match marker.argument("message", 0) {
        None => String::new(),
        Some(AnnotationValue::String(text)) => text.clone(),
        Some(other) => {
            tracing::warn!(value = ?other, "deprecation message is not a string literal, ignoring it");
            String::new()
        }
    };

    let replace_with = match marker.argument("replaceWith", 1) {
        Some(AnnotationValue::String(expression)) => expression.clone(),
        Some(AnnotationValue::Annotation(inner)) => inner
            .argument("expression", 0)
            .and_then(AnnotationValue::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };

    let level = match marker.argument("level", 2) {
        None => DeprecationLevel::default(),
        Some(AnnotationValue::Enum(text) | AnnotationValue::String(text) | AnnotationValue::Other(text)) => {
            DeprecationLevel::parse(text).unwrap_or_else(|| {
                tracing::warn!(level = %text, "unknown deprecation level, using WARNING");
                DeprecationLevel::default()
            })
        }
        Some(other) => {
            tracing::warn!(value = ?other, "unsupported deprecation level, using WARNING");
            DeprecationLevel::default()
        }
    };

    Deprecation {
        message,
        replace_with,
        level,
    }
}
