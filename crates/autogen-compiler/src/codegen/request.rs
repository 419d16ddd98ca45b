//! Request artifact: a singleton passing every call straight to the service.

use std::collections::BTreeSet;

use crate::config::Conventions;
use crate::ir::{ServiceIR, TypeRef};
use super::deprecation;
use super::naming;
use super::model::*;
use super::{
    declared_return_type, fallback_imports, forwarded_arguments, forwarded_type_arguments, method_modifiers,
    parameter_specs,
};

/// Builds `object XRequest` for a service.
pub fn build_request(service: &ServiceIR, conventions: &Conventions) -> GeneratedClassSpec {
    let name = naming::request_name(&service.interface, conventions);
    let helper_type = TypeRef::qualified(&conventions.request_helper);
    let service_type = service.interface.type_ref();

    // createService(UserApi::class.java[, "host"])
    let mut create_arguments = vec![Expr::ClassLiteral(service_type.clone())];
    if !service.interface.host.is_empty() {
        create_arguments.push(Expr::StringLiteral(service.interface.host.clone()));
    }

    let fields = vec![
        FieldSpec {
            name: conventions.helper_field.clone(),
            ty: helper_type.clone(),
            initializer: Expr::call(Expr::Type(helper_type), &conventions.request_helper_factory, Vec::new()),
        },
        FieldSpec {
            name: conventions.service_field.clone(),
            ty: service_type,
            initializer: Expr::call(
                Expr::Name(conventions.helper_field.clone()),
                &conventions.create_service,
                create_arguments,
            ),
        },
    ];

    let methods = service
        .methods
        .iter()
        .map(|method| GeneratedMethodSpec {
            name: method.name.clone(),
            type_parameters: method.type_parameters.clone(),
            parameters: parameter_specs(method),
            return_type: declared_return_type(method),
            body: MethodBody {
                call: Expr::generic_call(
                    Expr::Name(conventions.service_field.clone()),
                    &method.name,
                    forwarded_type_arguments(method),
                    forwarded_arguments(method),
                ),
                composition: None,
            },
            deprecation: deprecation::translate(method.deprecation.as_ref()),
            modifiers: method_modifiers(method, false),
        })
        .collect();

    GeneratedClassSpec {
        package: name.package,
        name: name.name,
        kind: ClassKind::Object,
        modifiers: BTreeSet::new(),
        superclass: None,
        fields,
        methods,
        fallback_imports: fallback_imports(&service.interface),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InterfaceDescriptor, MethodDescriptor, ParameterDescriptor};

    fn service(host: &str) -> ServiceIR {
        ServiceIR {
            interface: InterfaceDescriptor {
                simple_name: "UserApi".to_string(),
                namespace: "com.app.api".to_string(),
                enclosing: Vec::new(),
                host: host.to_string(),
                star_imports: Vec::new(),
                origin: None,
            },
            methods: vec![MethodDescriptor {
                name: "login".to_string(),
                type_parameters: Vec::new(),
                parameters: vec![
                    ParameterDescriptor { name: "name".to_string(), ty: TypeRef::qualified("kotlin.String"), vararg: false },
                    ParameterDescriptor { name: "pass".to_string(), ty: TypeRef::qualified("kotlin.String"), vararg: false },
                ],
                return_type: TypeRef::generic(
                    "io.reactivex.Observable",
                    vec![TypeRef::generic(
                        "com.baselib.model.response.BaseResponse",
                        vec![TypeRef::qualified("com.app.model.Token")],
                    )],
                ),
                deprecation: None,
                scheduler_opt_out: false,
                is_suspend: false,
            }],
        }
    }

    #[test]
    fn test_request_shape() {
        let spec = build_request(&service(""), &Conventions::default());
        assert_eq!(spec.package, "com.app.api.request");
        assert_eq!(spec.name, "UserApiRequest");
        assert_eq!(spec.kind, ClassKind::Object);
        assert_eq!(spec.fields.len(), 2);
        assert_eq!(spec.fields[0].name, "apiRequestHelper");
        assert_eq!(spec.fields[1].name, "apiService");
        assert_eq!(
            spec.fields[1].initializer,
            Expr::call(
                Expr::Name("apiRequestHelper".to_string()),
                "createService",
                vec![Expr::ClassLiteral(TypeRef::qualified("com.app.api.UserApi"))],
            )
        );

        let login = &spec.methods[0];
        assert_eq!(login.name, "login");
        assert!(login.body.composition.is_none());
        assert!(login.modifiers.is_empty());
        assert_eq!(login.return_type.as_ref(), Some(&service("").methods[0].return_type));
        assert_eq!(
            login.body.call,
            Expr::call(
                Expr::Name("apiService".to_string()),
                "login",
                vec![Expr::Name("name".to_string()), Expr::Name("pass".to_string())],
            )
        );
    }

    #[test]
    fn test_host_is_second_argument() {
        let spec = build_request(&service("https://api.example.com"), &Conventions::default());
        match &spec.fields[1].initializer {
            Expr::Call { arguments, .. } => {
                assert_eq!(arguments.len(), 2);
                assert_eq!(arguments[1], Expr::StringLiteral("https://api.example.com".to_string()));
            }
            other => panic!("unexpected initializer: {other:?}"),
        }
    }
}
