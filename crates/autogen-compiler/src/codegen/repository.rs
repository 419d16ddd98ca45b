//! Repository artifact: delegates to the Request singleton and adds
//! scheduling or result handling to stream-returning methods.

use std::collections::BTreeSet;

use crate::config::Conventions;
use crate::ir::{MethodDescriptor, ReturnShape, ServiceIR, TypeRef};
use super::deprecation;
use super::naming;
use super::model::*;
use super::{
    declared_return_type, fallback_imports, forwarded_arguments, forwarded_type_arguments, method_modifiers,
    parameter_specs,
};

/// Builds `open class XRepository : AbsRepository()` for a service.
pub fn build_repository(service: &ServiceIR, conventions: &Conventions) -> GeneratedClassSpec {
    let name = naming::repository_name(&service.interface, conventions);
    let request = naming::request_name(&service.interface, conventions).type_ref();

    let methods = service
        .methods
        .iter()
        .map(|method| {
            let composition = composition_for(method, conventions);
            GeneratedMethodSpec {
                name: method.name.clone(),
                type_parameters: method.type_parameters.clone(),
                parameters: parameter_specs(method),
                // The operator may change the element type; let Kotlin infer it.
                return_type: if composition.is_some() { None } else { declared_return_type(method) },
                body: MethodBody {
                    call: Expr::generic_call(
                        Expr::Type(request.clone()),
                        &method.name,
                        forwarded_type_arguments(method),
                        forwarded_arguments(method),
                    ),
                    composition,
                },
                deprecation: deprecation::translate(method.deprecation.as_ref()),
                modifiers: method_modifiers(method, true),
            }
        })
        .collect();

    GeneratedClassSpec {
        package: name.package,
        name: name.name,
        kind: ClassKind::Class,
        modifiers: BTreeSet::from([Modifier::Open]),
        superclass: Some(TypeRef::qualified(&conventions.base_repository)),
        fields: Vec::new(),
        methods,
        fallback_imports: fallback_imports(&service.interface),
    }
}

/// Decides the composition operator for one method.
///
/// The opt-out marker wins over everything. Otherwise a stream of the base
/// response gets result handling, any other stream gets schedulers, and
/// anything else is left alone.
pub fn composition_for(method: &MethodDescriptor, conventions: &Conventions) -> Option<ComposeOperator> {
    if method.scheduler_opt_out {
        return None;
    }
    let (kind, operator) = match ReturnShape::classify(&method.return_type, conventions) {
        ReturnShape::NotStream => return None,
        ReturnShape::Stream => (CompositionKind::ApplySchedulers, &conventions.apply_schedulers),
        ReturnShape::StreamOfResponse => (CompositionKind::HandleResult, &conventions.handle_result),
    };
    Some(ComposeOperator {
        kind,
        method: conventions.compose_method.clone(),
        operator: operator.clone(),
        safe_call: matches!(method.return_type, TypeRef::Declared { nullable: true, .. }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InterfaceDescriptor, ParameterDescriptor};

    fn token() -> TypeRef {
        TypeRef::qualified("com.app.model.Token")
    }

    fn observable(argument: TypeRef) -> TypeRef {
        TypeRef::generic("io.reactivex.Observable", vec![argument])
    }

    fn base_response(argument: TypeRef) -> TypeRef {
        TypeRef::generic("com.baselib.model.response.BaseResponse", vec![argument])
    }

    fn method(return_type: TypeRef, opt_out: bool) -> MethodDescriptor {
        MethodDescriptor {
            name: "login".to_string(),
            type_parameters: Vec::new(),
            parameters: vec![
                ParameterDescriptor { name: "name".to_string(), ty: TypeRef::qualified("kotlin.String"), vararg: false },
                ParameterDescriptor { name: "pass".to_string(), ty: TypeRef::qualified("kotlin.String"), vararg: false },
            ],
            return_type,
            deprecation: None,
            scheduler_opt_out: opt_out,
            is_suspend: false,
        }
    }

    fn service(methods: Vec<MethodDescriptor>) -> ServiceIR {
        ServiceIR {
            interface: InterfaceDescriptor {
                simple_name: "UserApi".to_string(),
                namespace: "com.app.api".to_string(),
                enclosing: Vec::new(),
                host: String::new(),
                star_imports: Vec::new(),
                origin: None,
            },
            methods,
        }
    }

    fn kind(return_type: TypeRef, opt_out: bool) -> Option<CompositionKind> {
        composition_for(&method(return_type, opt_out), &Conventions::default()).map(|c| c.kind)
    }

    #[test]
    fn test_composition_decision_table() {
        assert_eq!(kind(observable(base_response(token())), false), Some(CompositionKind::HandleResult));
        assert_eq!(kind(observable(token()), false), Some(CompositionKind::ApplySchedulers));
        assert_eq!(kind(observable(base_response(token())), true), None);
        assert_eq!(kind(observable(token()), true), None);
        assert_eq!(kind(token(), false), None);
        assert_eq!(kind(TypeRef::unit(), false), None);
        assert_eq!(kind(TypeRef::unresolved("Observable"), false), None);
    }

    #[test]
    fn test_operator_names_come_from_conventions() {
        let conventions = Conventions {
            compose_method: "transform".to_string(),
            handle_result: "unwrap".to_string(),
            ..Conventions::default()
        };
        let operator = composition_for(&method(observable(base_response(token())), false), &conventions).unwrap();
        assert_eq!(operator.method, "transform");
        assert_eq!(operator.operator, "unwrap");
    }

    #[test]
    fn test_repository_shape() {
        let spec = build_repository(
            &service(vec![method(observable(base_response(token())), false), method(token(), false)]),
            &Conventions::default(),
        );
        assert_eq!(spec.package, "com.app.api.repository");
        assert_eq!(spec.name, "UserApiRepository");
        assert_eq!(spec.kind, ClassKind::Class);
        assert!(spec.modifiers.contains(&Modifier::Open));
        assert_eq!(spec.superclass, Some(TypeRef::qualified("com.baselib.model.repository.AbsRepository")));
        assert!(spec.fields.is_empty());

        let composed = &spec.methods[0];
        assert!(composed.modifiers.contains(&Modifier::Open));
        assert!(composed.return_type.is_none());
        assert_eq!(
            composed.body.call,
            Expr::call(
                Expr::Type(TypeRef::qualified("com.app.api.request.UserApiRequest")),
                "login",
                vec![Expr::Name("name".to_string()), Expr::Name("pass".to_string())],
            )
        );

        let plain = &spec.methods[1];
        assert!(plain.body.composition.is_none());
        assert_eq!(plain.return_type, Some(token()));
    }

    #[test]
    fn test_nullable_stream_uses_safe_call() {
        let nullable_stream = match observable(token()) {
            TypeRef::Declared { name, qualified, arguments, .. } => TypeRef::Declared {
                name,
                qualified,
                arguments,
                nullable: true,
            },
            other => other,
        };
        let conventions = Conventions::default();
        let operator = composition_for(&method(nullable_stream, false), &conventions).unwrap();
        assert_eq!(operator.kind, CompositionKind::ApplySchedulers);
        assert!(operator.safe_call);

        let operator = composition_for(&method(observable(token()), false), &conventions).unwrap();
        assert!(!operator.safe_call);
    }
}
