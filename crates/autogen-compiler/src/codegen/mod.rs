//! Kotlin code generation from collected services.
//!
//! Every annotated interface yields two classes:
//! - `XRequest`, a singleton forwarding each call to the network service
//! - `XRepository`, an open class forwarding to `XRequest` and composing
//!   stream results with scheduling or result handling
//!
//! Emitters build structured [`GeneratedClassSpec`]s; [`kotlin`] renders them.

mod deprecation;
pub mod kotlin;
pub mod model;
pub mod naming;
mod repository;
mod request;

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::Conventions;
use crate::ir::{InterfaceDescriptor, MethodDescriptor, ServiceIR, TypeRef};

pub use model::*;
pub use repository::{build_repository, composition_for};
pub use request::build_request;

/// Generated Kotlin code, held in memory until written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub files: Vec<GeneratedFile>,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub content: String,
}

/// Builds the Request and Repository specs for one service, in that order.
pub fn build_classes(service: &ServiceIR, conventions: &Conventions) -> [GeneratedClassSpec; 2] {
    [build_request(service, conventions), build_repository(service, conventions)]
}

/// Generates Kotlin sources for every service.
#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn generate(services: &[ServiceIR], conventions: &Conventions) -> GeneratedCode {
    let mut files = Vec::new();

    for service in services {
        for class in build_classes(service, conventions) {
            let name = naming::GeneratedName {
                package: class.package.clone(),
                name: class.name.clone(),
            };
            files.push(GeneratedFile {
                path: name.file_path(),
                content: kotlin::render_file(&class),
            });
        }
    }

    GeneratedCode { files }
}

fn parameter_specs(method: &MethodDescriptor) -> Vec<ParameterSpec> {
    method
        .parameters
        .iter()
        .map(|p| ParameterSpec {
            name: p.name.clone(),
            ty: p.ty.clone(),
            vararg: p.vararg,
        })
        .collect()
}

/// Parameters passed through in order, with varargs spread.
fn forwarded_arguments(method: &MethodDescriptor) -> Vec<Expr> {
    method
        .parameters
        .iter()
        .map(|p| {
            let name = Expr::Name(p.name.clone());
            if p.vararg {
                Expr::Spread(Box::new(name))
            } else {
                name
            }
        })
        .collect()
}

/// Type parameter names passed explicitly, since a variable used only in
/// the return type cannot be inferred once that type is left out.
fn forwarded_type_arguments(method: &MethodDescriptor) -> Vec<String> {
    method.type_parameters.iter().map(|p| type_parameter_name(p)).collect()
}

/// `reified T : Comparable<T>` names `T`.
fn type_parameter_name(declaration: &str) -> String {
    let head = declaration.split(':').next().unwrap_or(declaration);
    head.split_whitespace().last().unwrap_or(head).to_string()
}

/// The declared return type, or `None` where Kotlin needs nothing written.
fn declared_return_type(method: &MethodDescriptor) -> Option<TypeRef> {
    match &method.return_type {
        TypeRef::Inferred => None,
        ty if ty.is_unit() => None,
        ty => Some(ty.clone()),
    }
}

/// The interface's own package, then every package its file star-imports.
fn fallback_imports(interface: &InterfaceDescriptor) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    let own = (!interface.namespace.is_empty()).then_some(&interface.namespace);
    for package in own.into_iter().chain(&interface.star_imports) {
        if !packages.contains(package) {
            packages.push(package.clone());
        }
    }
    packages
}

fn method_modifiers(method: &MethodDescriptor, open: bool) -> BTreeSet<Modifier> {
    let mut modifiers = BTreeSet::new();
    if open {
        modifiers.insert(Modifier::Open);
    }
    if method.is_suspend {
        modifiers.insert(Modifier::Suspend);
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::ir::{InterfaceDescriptor, ParameterDescriptor};

    fn service() -> ServiceIR {
        ServiceIR {
            interface: InterfaceDescriptor {
                simple_name: "UserApi".to_string(),
                namespace: "com.app.api".to_string(),
                enclosing: Vec::new(),
                host: String::new(),
                star_imports: Vec::new(),
                origin: None,
            },
            methods: vec![MethodDescriptor {
                name: "tag".to_string(),
                type_parameters: vec!["T".to_string()],
                parameters: vec![
                    ParameterDescriptor { name: "key".to_string(), ty: TypeRef::qualified("kotlin.String"), vararg: false },
                    ParameterDescriptor { name: "ids".to_string(), ty: TypeRef::qualified("kotlin.Long"), vararg: true },
                ],
                return_type: TypeRef::unit(),
                deprecation: None,
                scheduler_opt_out: false,
                is_suspend: true,
            }],
        }
    }

    #[test]
    fn test_generate_paths() {
        let code = generate(&[service()], &Conventions::default());
        let paths: Vec<&Path> = code.files.iter().map(|f| f.path.as_path()).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("com/app/api/request/UserApiRequest.kt"),
                Path::new("com/app/api/repository/UserApiRepository.kt"),
            ]
        );
    }

    #[test]
    fn test_vararg_suspend_and_type_parameters() {
        let [request, repository] = build_classes(&service(), &Conventions::default());
        let request_code = kotlin::render_file(&request);
        assert!(
            request_code.contains("    suspend fun <T> tag(key: String, vararg ids: Long) = apiService.tag<T>(key, *ids)\n"),
            "{request_code}"
        );
        let repository_code = kotlin::render_file(&repository);
        assert!(
            repository_code.contains("    open suspend fun <T> tag(key: String, vararg ids: Long) = UserApiRequest.tag<T>(key, *ids)\n"),
            "{repository_code}"
        );
    }

    #[test]
    fn test_type_parameter_names() {
        assert_eq!(type_parameter_name("T"), "T");
        assert_eq!(type_parameter_name("reified T : Comparable<T>"), "T");
        assert_eq!(type_parameter_name("out R"), "R");
    }

    #[test]
    fn test_fallback_imports_start_with_own_package() {
        let mut interface = service().interface;
        interface.star_imports = vec!["com.other.model".to_string(), "com.app.api".to_string()];
        assert_eq!(fallback_imports(&interface), vec!["com.app.api", "com.other.model"]);

        interface.namespace = String::new();
        assert_eq!(fallback_imports(&interface), vec!["com.other.model", "com.app.api"]);
    }
}
