//! Deprecation marker translation.

use crate::ir::Deprecation;
use super::model::DeprecatedAnnotation;

/// Maps the custom marker's contents onto Kotlin's `@Deprecated`.
pub fn translate(deprecation: Option<&Deprecation>) -> Option<DeprecatedAnnotation> {
    deprecation.map(|d| DeprecatedAnnotation {
        message: d.message.clone(),
        replace_with: d.replace_with.clone(),
        level: d.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DeprecationLevel;

    #[test]
    fn test_translate_copies_every_field() {
        let marker = Deprecation {
            message: "use v2".to_string(),
            replace_with: "loginV2()".to_string(),
            level: DeprecationLevel::Hidden,
        };
        let annotation = translate(Some(&marker)).unwrap();
        assert_eq!(annotation.message, "use v2");
        assert_eq!(annotation.replace_with, "loginV2()");
        assert_eq!(annotation.level, DeprecationLevel::Hidden);
        assert!(translate(None).is_none());
    }
}
