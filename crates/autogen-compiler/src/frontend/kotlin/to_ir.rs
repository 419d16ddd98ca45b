//! Convert Kotlin AST to language-neutral declarations.
//!
//! Written names are resolved to qualified names the way Kotlin looks them
//! up: explicit imports, then enclosing declarations and the file's package,
//! then star imports, then the default `kotlin` imports. Anything that cannot
//! be found stays unresolved.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::config::Conventions;
use crate::ir::{
    Annotation, AnnotationArgument, AnnotationValue, Declaration, DeclarationKind, Member, MethodDecl,
    ParameterDecl, SourceSet, TypeRef, Visibility,
};
use super::ast::*;

/// Types visible in every Kotlin file through `kotlin.*`.
const KOTLIN_TYPES: &[&str] = &[
    "Any", "Nothing", "Unit", "String", "CharSequence", "Char", "Boolean", "Byte", "Short", "Int",
    "Long", "Float", "Double", "Number", "Array", "BooleanArray", "ByteArray", "CharArray",
    "ShortArray", "IntArray", "LongArray", "FloatArray", "DoubleArray", "Pair", "Triple",
    "Throwable", "Exception", "RuntimeException", "Error", "Enum", "Comparable", "Result", "Lazy",
    "Deprecated", "ReplaceWith", "DeprecationLevel", "Suppress",
];

/// Types visible in every Kotlin file through `kotlin.collections.*`.
const COLLECTION_TYPES: &[&str] = &[
    "Iterable", "MutableIterable", "Collection", "MutableCollection", "List", "MutableList", "Set",
    "MutableSet", "Map", "MutableMap", "Iterator", "ArrayList", "HashMap", "HashSet",
    "LinkedHashMap", "LinkedHashSet",
];

/// Converts parsed Kotlin files into a [`SourceSet`].
pub fn to_ir(files: &[ParsedFile], source_dir: PathBuf, conventions: &Conventions) -> SourceSet {
    let symbols = build_symbol_table(files, conventions);
    let mut source_set = SourceSet::new(source_dir);

    for file in files {
        let resolver = Resolver::new(file, &symbols);
        for class in &file.declarations {
            convert_declaration(class, &[], file, &resolver, &mut source_set.declarations);
        }
    }

    source_set
}

/// Qualified names of every type declared in the parsed files, plus the
/// runtime types named by the conventions.
fn build_symbol_table(files: &[ParsedFile], conventions: &Conventions) -> HashSet<String> {
    fn visit(class: &ClassDecl, prefix: &str, symbols: &mut HashSet<String>) {
        if matches!(class.kind, DeclarationKind::Function | DeclarationKind::Property) {
            return;
        }
        let qualified = join_name(prefix, &class.name);
        for nested in &class.nested {
            visit(nested, &qualified, symbols);
        }
        symbols.insert(qualified);
    }

    let mut symbols: HashSet<String> = conventions.known_types().into_iter().map(str::to_string).collect();
    for file in files {
        for class in &file.declarations {
            visit(class, &file.package, &mut symbols);
        }
    }
    symbols
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Per-file name lookup.
struct Resolver<'a> {
    package: &'a str,
    /// Visible simple name (or alias) to qualified name.
    explicit: HashMap<&'a str, &'a str>,
    stars: Vec<&'a str>,
    symbols: &'a HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(file: &'a ParsedFile, symbols: &'a HashSet<String>) -> Self {
        let mut explicit = HashMap::new();
        let mut stars = Vec::new();
        for import in &file.imports {
            if import.wildcard {
                stars.push(import.path.as_str());
            } else {
                let visible = import
                    .alias
                    .as_deref()
                    .unwrap_or_else(|| import.path.rsplit('.').next().unwrap_or(&import.path));
                explicit.insert(visible, import.path.as_str());
            }
        }
        Self {
            package: &file.package,
            explicit,
            stars,
            symbols,
        }
    }

    /// Resolves a written (possibly dotted) name seen inside `scope`, the
    /// chain of declarations enclosing the use.
    fn resolve(&self, written: &str, scope: &[String]) -> Option<String> {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };
        // `io.reactivex.Observable` is already qualified.
        if rest.is_some() && head.starts_with(|c: char| c.is_lowercase()) {
            return Some(written.to_string());
        }
        let resolved = self.resolve_simple(head, scope)?;
        Some(match rest {
            Some(rest) => format!("{}.{}", resolved, rest),
            None => resolved,
        })
    }

    fn resolve_simple(&self, name: &str, scope: &[String]) -> Option<String> {
        if let Some(qualified) = self.explicit.get(name) {
            return Some(qualified.to_string());
        }

        for depth in (0..=scope.len()).rev() {
            let mut prefix = self.package.to_string();
            for outer in &scope[..depth] {
                prefix = join_name(&prefix, outer);
            }
            let candidate = join_name(&prefix, name);
            if self.symbols.contains(&candidate) {
                return Some(candidate);
            }
        }

        for star in &self.stars {
            let candidate = join_name(star, name);
            if self.symbols.contains(&candidate) {
                return Some(candidate);
            }
        }

        if KOTLIN_TYPES.contains(&name) {
            Some(format!("kotlin.{}", name))
        } else if COLLECTION_TYPES.contains(&name) {
            Some(format!("kotlin.collections.{}", name))
        } else {
            None
        }
    }
}

fn convert_declaration(
    class: &ClassDecl,
    enclosing: &[String],
    file: &ParsedFile,
    resolver: &Resolver,
    out: &mut Vec<Declaration>,
) {
    let mut scope = enclosing.to_vec();
    scope.push(class.name.clone());

    let mut members = Vec::new();
    for function in &class.functions {
        if function.receiver.is_some() {
            tracing::debug!(function = %function.name, "skipping extension function");
            continue;
        }
        members.push(Member::Method(convert_function(function, &scope, resolver)));
    }
    for property in &class.properties {
        members.push(Member::Property { name: property.clone() });
    }

    out.push(Declaration {
        name: class.name.clone(),
        namespace: file.package.clone(),
        enclosing: enclosing.to_vec(),
        kind: class.kind,
        annotations: convert_annotations(&class.annotations, enclosing, resolver),
        members,
        star_imports: file.imports.iter().filter(|i| i.wildcard).map(|i| i.path.clone()).collect(),
        origin: Some(class.span.clone()),
    });

    for nested in &class.nested {
        convert_declaration(nested, &scope, file, resolver, out);
    }
}

fn convert_function(function: &FunctionDecl, scope: &[String], resolver: &Resolver) -> MethodDecl {
    let type_variables: Vec<&str> = function.type_parameters.iter().map(|p| p.name.as_str()).collect();
    let types = TypeConverter {
        resolver,
        scope,
        type_variables: &type_variables,
    };

    let return_type = match &function.return_type {
        Some(node) => types.convert(node),
        None if function.expression_body => TypeRef::Inferred,
        None => TypeRef::unit(),
    };

    MethodDecl {
        name: function.name.clone(),
        type_parameters: function.type_parameters.iter().map(|p| p.text.clone()).collect(),
        parameters: function
            .parameters
            .iter()
            .map(|p| ParameterDecl {
                name: p.name.clone(),
                ty: types.convert(&p.type_node),
                vararg: p.vararg,
            })
            .collect(),
        return_type,
        annotations: convert_annotations(&function.annotations, scope, resolver),
        visibility: visibility(&function.modifiers),
        is_suspend: function.has_modifier("suspend"),
    }
}

fn visibility(modifiers: &[String]) -> Visibility {
    for modifier in modifiers {
        match modifier.as_str() {
            "private" => return Visibility::Private,
            "protected" => return Visibility::Protected,
            "internal" => return Visibility::Internal,
            "public" => return Visibility::Public,
            _ => {}
        }
    }
    Visibility::Public
}

struct TypeConverter<'a> {
    resolver: &'a Resolver<'a>,
    scope: &'a [String],
    type_variables: &'a [&'a str],
}

impl TypeConverter<'_> {
    fn convert(&self, node: &TypeNode) -> TypeRef {
        match node {
            TypeNode::Named { segments, arguments, nullable } => {
                if let [single] = segments.as_slice() {
                    if self.type_variables.contains(&single.as_str()) {
                        return TypeRef::Variable {
                            name: single.clone(),
                            nullable: *nullable,
                        };
                    }
                }
                let name = segments.join(".");
                TypeRef::Declared {
                    qualified: self.resolver.resolve(&name, self.scope),
                    name,
                    arguments: arguments.iter().map(|a| self.convert(a)).collect(),
                    nullable: *nullable,
                }
            }
            TypeNode::Projection { variance, inner } => TypeRef::Projection {
                variance: *variance,
                inner: Box::new(self.convert(inner)),
            },
            TypeNode::Star => TypeRef::Star,
            TypeNode::Function { text } => TypeRef::Opaque { text: text.clone() },
        }
    }
}

fn convert_annotations(annotations: &[AnnotationNode], scope: &[String], resolver: &Resolver) -> Vec<Annotation> {
    annotations
        .iter()
        .map(|a| convert_annotation(&a.name, &a.arguments, scope, resolver))
        .collect()
}

fn convert_annotation(name: &str, arguments: &[ArgumentNode], scope: &[String], resolver: &Resolver) -> Annotation {
    Annotation {
        name: name.to_string(),
        qualified: resolver.resolve(name, scope),
        arguments: arguments
            .iter()
            .map(|arg| AnnotationArgument {
                name: arg.name.clone(),
                value: convert_value(&arg.value, scope, resolver),
            })
            .collect(),
    }
}

fn convert_value(value: &ValueNode, scope: &[String], resolver: &Resolver) -> AnnotationValue {
    match value {
        ValueNode::String(s) => AnnotationValue::String(s.clone()),
        ValueNode::Reference(r) => AnnotationValue::Enum(r.clone()),
        ValueNode::Call { callee, arguments } => {
            AnnotationValue::Annotation(convert_annotation(callee, arguments, scope, resolver))
        }
        ValueNode::Array(items) => {
            AnnotationValue::Array(items.iter().map(|v| convert_value(v, scope, resolver)).collect())
        }
        ValueNode::Other(text) => AnnotationValue::Other(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::frontend::kotlin::parser::KotlinParser;
    use crate::ir::{ReturnShape, TypeDescriptor};

    fn convert(sources: &[(&str, &str)]) -> SourceSet {
        let mut parser = KotlinParser::new();
        let files: Vec<ParsedFile> = sources
            .iter()
            .map(|(path, source)| parser.parse(source, Path::new(path)).unwrap())
            .collect();
        to_ir(&files, PathBuf::from("src"), &Conventions::default())
    }

    fn find<'a>(set: &'a SourceSet, name: &str) -> &'a Declaration {
        set.declarations.iter().find(|d| d.name == name).unwrap()
    }

    const USER_API: &str = r#"
        package com.app.api

        import com.github.annotation.Autogen
        import com.github.annotation.CloseScheduler
        import com.baselib.model.response.BaseResponse
        import io.reactivex.Observable
        import com.app.model.*

        @Autogen("https://api.example.com")
        interface UserApi {
            fun login(name: String, pass: String): Observable<BaseResponse<Token>>

            @CloseScheduler
            fun profile(id: Long): Observable<Profile>

            fun <T> raw(vararg keys: String): List<T>

            fun cached(): Session

            fun Int.ignored(): Observable<Token>
        }
    "#;

    const MODEL: &str = r#"
        package com.app.model

        class Token(val value: String)
        data class Profile(val name: String)
    "#;

    #[test]
    fn test_resolves_imports_and_builtins() {
        let set = convert(&[("api/UserApi.kt", USER_API), ("model/Model.kt", MODEL)]);
        let api = find(&set, "UserApi");
        assert_eq!(api.qualified_name(), "com.app.api.UserApi");
        assert_eq!(api.annotations[0].qualified.as_deref(), Some("com.github.annotation.Autogen"));

        let methods: Vec<&MethodDecl> = api.methods().collect();
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["login", "profile", "raw", "cached"]);

        let conventions = Conventions::default();
        assert_eq!(
            ReturnShape::classify(&methods[0].return_type, &conventions),
            ReturnShape::StreamOfResponse
        );
        assert_eq!(ReturnShape::classify(&methods[1].return_type, &conventions), ReturnShape::Stream);
        assert_eq!(
            methods[1].return_type.type_arguments()[0].raw_type(),
            Some("com.app.model.Profile")
        );
        assert_eq!(methods[0].parameters[0].ty, TypeRef::Declared {
            name: "String".to_string(),
            qualified: Some("kotlin.String".to_string()),
            arguments: vec![],
            nullable: false,
        });
    }

    #[test]
    fn test_type_variables_and_unresolved_names() {
        let set = convert(&[("api/UserApi.kt", USER_API), ("model/Model.kt", MODEL)]);
        let api = find(&set, "UserApi");
        let raw = api.methods().find(|m| m.name == "raw").unwrap();
        assert_eq!(raw.type_parameters, vec!["T"]);
        assert!(raw.parameters[0].vararg);
        assert_eq!(raw.return_type.raw_type(), Some("kotlin.collections.List"));
        assert_eq!(
            raw.return_type.type_arguments()[0],
            TypeRef::Variable { name: "T".to_string(), nullable: false }
        );

        // Not declared anywhere and not imported.
        let cached = api.methods().find(|m| m.name == "cached").unwrap();
        assert_eq!(cached.return_type.raw_type(), None);
    }

    #[test]
    fn test_same_package_and_nested_scopes() {
        let set = convert(&[(
            "Apis.kt",
            r#"
            package com.app

            import io.reactivex.Observable as Rx

            class Local

            interface Apis {
                class Inner

                @Autogen
                interface Nested {
                    fun a(): Rx<Local>
                    fun b(): Inner
                    fun c(): Apis.Inner
                    private fun d()
                    fun e() = 1
                }
            }
            "#,
        )]);

        let nested = find(&set, "Nested");
        assert_eq!(nested.enclosing, vec!["Apis"]);
        assert_eq!(nested.qualified_name(), "com.app.Apis.Nested");
        // Unresolved annotations keep their written name.
        assert_eq!(nested.annotations[0].qualified, None);

        let methods: Vec<&MethodDecl> = nested.methods().collect();
        assert_eq!(methods[0].return_type.raw_type(), Some("io.reactivex.Observable"));
        assert_eq!(methods[0].return_type.to_string(), "Rx<Local>");
        assert_eq!(methods[0].return_type.type_arguments()[0].raw_type(), Some("com.app.Local"));
        assert_eq!(methods[1].return_type.raw_type(), Some("com.app.Apis.Inner"));
        assert_eq!(methods[2].return_type.raw_type(), Some("com.app.Apis.Inner"));
        assert_eq!(methods[3].visibility, Visibility::Private);
        assert!(methods[3].return_type.is_unit());
        assert_eq!(methods[4].return_type, TypeRef::Inferred);
    }

    #[test]
    fn test_annotation_values() {
        let set = convert(&[(
            "Api.kt",
            r#"
            package com.app
            import com.github.annotation.DeprecatedApi

            interface Api {
                @DeprecatedApi("old", replaceWith = ReplaceWith("b()"), level = DeprecationLevel.HIDDEN)
                suspend fun a(): String
            }
            "#,
        )]);
        let method = find(&set, "Api").methods().next().unwrap();
        assert!(method.is_suspend);
        let annotation = method.annotation("com.github.annotation.DeprecatedApi").unwrap();
        assert_eq!(annotation.argument("message", 0).and_then(AnnotationValue::as_str), Some("old"));
        match annotation.argument("replaceWith", 1) {
            Some(AnnotationValue::Annotation(inner)) => {
                assert_eq!(inner.qualified.as_deref(), Some("kotlin.ReplaceWith"));
                assert_eq!(inner.argument("expression", 0).and_then(AnnotationValue::as_str), Some("b()"));
            }
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(
            annotation.argument("level", 2),
            Some(&AnnotationValue::Enum("DeprecationLevel.HIDDEN".to_string()))
        );
    }
}
