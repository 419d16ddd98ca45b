//! Kotlin source rendering.
//!
//! Generates Kotlin directly without templates. Resolved types are imported
//! and written by simple name; a simple name already taken by another type
//! (or by the class being generated) is written fully qualified instead.

use std::collections::{BTreeSet, HashMap};

use crate::ir::{package_of, simple_name, TypeRef, Variance};
use super::model::*;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by autogen. Do not edit.";

/// Packages Kotlin imports implicitly.
const DEFAULT_PACKAGES: &[&str] = &["kotlin", "kotlin.collections"];

/// Hard keywords that must be backtick-quoted when used as identifiers.
const HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Renders a complete Kotlin file for one class.
pub fn render_file(spec: &GeneratedClassSpec) -> String {
    let mut imports = ImportCollector::new(&spec.package, &spec.name);
    let body = render_class(spec, &mut imports);
    imports.add_fallbacks(&spec.fallback_imports);

    let mut code = String::new();
    code.push_str(GENERATED_HEADER);
    code.push('\n');
    if !spec.package.is_empty() {
        code.push_str(&format!("package {}\n", escape_qualified(&spec.package)));
    }
    code.push('\n');

    if !imports.imports.is_empty() {
        for import in &imports.imports {
            code.push_str(&format!("import {}\n", escape_qualified(import)));
        }
        code.push('\n');
    }

    code.push_str(&body);
    code
}

/// Tracks which simple names refer to which qualified types in one file.
struct ImportCollector<'a> {
    package: &'a str,
    class_name: &'a str,
    by_simple_name: HashMap<String, String>,
    imports: BTreeSet<String>,
    /// A type was written as it appeared in source, without resolution.
    unresolved: bool,
}

impl<'a> ImportCollector<'a> {
    fn new(package: &'a str, class_name: &'a str) -> Self {
        Self {
            package,
            class_name,
            by_simple_name: HashMap::new(),
            imports: BTreeSet::new(),
            unresolved: false,
        }
    }

    /// Star-imports `packages` if any type was left unresolved.
    fn add_fallbacks(&mut self, packages: &[String]) {
        if !self.unresolved {
            return;
        }
        for package in packages {
            if package != self.package && !DEFAULT_PACKAGES.contains(&package.as_str()) {
                self.imports.insert(format!("{}.*", package));
            }
        }
    }

    /// The name to write for a qualified type, importing it if needed.
    fn name_for(&mut self, qualified: &str) -> String {
        let simple = simple_name(qualified);
        let own = join(self.package, self.class_name);
        if simple == self.class_name && qualified != own {
            return escape_qualified(qualified);
        }

        match self.by_simple_name.get(simple) {
            Some(existing) if existing == qualified => escape_identifier(simple),
            Some(_) => escape_qualified(qualified),
            None => {
                self.by_simple_name.insert(simple.to_string(), qualified.to_string());
                let package = package_of(qualified);
                if !package.is_empty() && package != self.package && !DEFAULT_PACKAGES.contains(&package) {
                    self.imports.insert(qualified.to_string());
                }
                escape_identifier(simple)
            }
        }
    }
}

fn join(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn render_class(spec: &GeneratedClassSpec, imports: &mut ImportCollector) -> String {
    let mut code = String::new();

    for modifier in &spec.modifiers {
        code.push_str(modifier.keyword());
        code.push(' ');
    }
    code.push_str(match spec.kind {
        ClassKind::Object => "object ",
        ClassKind::Class => "class ",
    });
    code.push_str(&escape_identifier(&spec.name));
    if let Some(superclass) = &spec.superclass {
        code.push_str(&format!(" : {}()", render_type(superclass, imports)));
    }
    code.push_str(" {\n");

    for field in &spec.fields {
        code.push_str(&format!(
            "    private val {}: {} = {}\n",
            escape_identifier(&field.name),
            render_type(&field.ty, imports),
            render_expr(&field.initializer, imports)
        ));
    }

    for (i, method) in spec.methods.iter().enumerate() {
        if i > 0 || !spec.fields.is_empty() {
            code.push('\n');
        }
        code.push_str(&render_method(method, imports));
    }

    code.push_str("}\n");
    code
}

fn render_method(method: &GeneratedMethodSpec, imports: &mut ImportCollector) -> String {
    let mut code = String::new();

    if let Some(deprecation) = &method.deprecation {
        code.push_str(&format!("    {}\n", render_deprecated(deprecation)));
    }

    code.push_str("    ");
    for modifier in &method.modifiers {
        code.push_str(modifier.keyword());
        code.push(' ');
    }
    code.push_str("fun ");
    if !method.type_parameters.is_empty() {
        code.push_str(&format!("<{}> ", method.type_parameters.join(", ")));
    }

    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| {
            format!(
                "{}{}: {}",
                if p.vararg { "vararg " } else { "" },
                escape_identifier(&p.name),
                render_type(&p.ty, imports)
            )
        })
        .collect();
    code.push_str(&format!("{}({})", escape_identifier(&method.name), parameters.join(", ")));

    if let Some(return_type) = &method.return_type {
        code.push_str(&format!(": {}", render_type(return_type, imports)));
    }

    code.push_str(" = ");
    code.push_str(&render_expr(&method.body.call, imports));
    if let Some(composition) = &method.body.composition {
        code.push_str(&format!(
            "{}{}({}())",
            if composition.safe_call { "?." } else { "." },
            escape_identifier(&composition.method),
            escape_identifier(&composition.operator)
        ));
    }
    code.push('\n');
    code
}

/// `@Deprecated("message", ReplaceWith("expression"), DeprecationLevel.LEVEL)`.
pub fn render_deprecated(annotation: &DeprecatedAnnotation) -> String {
    format!(
        "@Deprecated({}, ReplaceWith({}), DeprecationLevel.{})",
        string_literal(&annotation.message),
        string_literal(&annotation.replace_with),
        annotation.level.as_str()
    )
}

/// Writes a type reference.
fn render_type(ty: &TypeRef, imports: &mut ImportCollector) -> String {
    match ty {
        TypeRef::Declared { name, qualified, arguments, nullable } => {
            let mut out = match qualified {
                Some(qualified) => imports.name_for(qualified),
                None => {
                    imports.unresolved = true;
                    escape_qualified(name)
                }
            };
            if !arguments.is_empty() {
                let arguments: Vec<String> = arguments.iter().map(|a| render_type(a, imports)).collect();
                out.push_str(&format!("<{}>", arguments.join(", ")));
            }
            if *nullable {
                out.push('?');
            }
            out
        }
        TypeRef::Variable { name, nullable } => {
            format!("{}{}", escape_identifier(name), if *nullable { "?" } else { "" })
        }
        TypeRef::Projection { variance, inner } => {
            let keyword = match variance {
                Variance::In => "in",
                Variance::Out => "out",
            };
            format!("{} {}", keyword, render_type(inner, imports))
        }
        TypeRef::Star => "*".to_string(),
        TypeRef::Opaque { text } => {
            imports.unresolved = true;
            text.clone()
        }
        TypeRef::Inferred => String::new(),
    }
}

fn render_expr(expr: &Expr, imports: &mut ImportCollector) -> String {
    match expr {
        Expr::Name(name) => escape_identifier(name),
        Expr::Type(ty) => render_type(ty, imports),
        Expr::Call { receiver, method, type_arguments, arguments } => {
            let arguments: Vec<String> = arguments.iter().map(|a| render_expr(a, imports)).collect();
            let type_arguments = if type_arguments.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = type_arguments.iter().map(|t| escape_identifier(t)).collect();
                format!("<{}>", names.join(", "))
            };
            let call = format!("{}{}({})", escape_identifier(method), type_arguments, arguments.join(", "));
            match receiver {
                Some(receiver) => format!("{}.{}", render_expr(receiver, imports), call),
                None => call,
            }
        }
        Expr::ClassLiteral(ty) => format!("{}::class.java", render_type(ty, imports)),
        Expr::StringLiteral(value) => string_literal(value),
        Expr::Spread(inner) => format!("*{}", render_expr(inner, imports)),
    }
}

/// Quotes a value as a Kotlin string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Backtick-quotes a keyword used as an identifier.
pub fn escape_identifier(name: &str) -> String {
    if HARD_KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

fn escape_qualified(name: &str) -> String {
    name.split('.').map(escape_identifier).collect::<Vec<_>>().join(".")
}
