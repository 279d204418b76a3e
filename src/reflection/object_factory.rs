//! Object construction.
//!
//! [`ObjectFactory`] creates instances of runtime types through their declared constructors.
//! [`DefaultObjectFactory`] picks the constructor by exact parameter types, applies the
//! privilege-escalation fallback, and reports every failure as
//! [`crate::Error::Instantiation`].
//!
//! Interfaces cannot be instantiated; [`DefaultObjectFactory::bind`] maps an interface to the
//! class created in its place.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{
        member::ConstructorRc,
        token::Token,
        typesystem::{TypeRc, TypeRegistry},
        value::{ObjectRc, Value},
    },
    reflection::access::{with_escalation, AccessPolicy, StaticAccess},
    Error::{self, Instantiation, MissingDefaultConstructor, NoSuchConstructor},
    Result,
};

/// Creates instances of runtime types.
pub trait ObjectFactory: Send + Sync {
    /// Create an instance through the zero-argument constructor
    ///
    /// # Errors
    /// Returns [`crate::Error::Instantiation`] if construction fails.
    fn create(&self, ty: &TypeRc) -> Result<ObjectRc> {
        self.create_with(ty, &[], &[])
    }

    /// Create an instance through the constructor declaring exactly `arg_types`
    ///
    /// # Errors
    /// Returns [`crate::Error::Instantiation`] if construction fails.
    fn create_with(&self, ty: &TypeRc, arg_types: &[TypeRc], args: &[Value]) -> Result<ObjectRc>;
}

/// Constructs objects through their declared constructors.
pub struct DefaultObjectFactory {
    registry: Arc<TypeRegistry>,
    policy: Arc<dyn AccessPolicy>,
    implementations: DashMap<Token, TypeRc>,
}

impl DefaultObjectFactory {
    /// Create a factory that may suppress access checks of non-public constructors
    ///
    /// ## Arguments
    /// * 'registry' - Registry used to erase declared parameter types
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        DefaultObjectFactory {
            registry,
            policy: Arc::new(StaticAccess(true)),
            implementations: DashMap::new(),
        }
    }

    /// Replace the escalation policy
    ///
    /// ## Arguments
    /// * 'policy' - The policy consulted after an access refusal
    #[must_use]
    pub fn with_access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Create instances of `implementation` whenever `interface` is requested
    ///
    /// ## Arguments
    /// * 'interface'      - The requested type
    /// * 'implementation' - The type actually instantiated
    pub fn bind(&self, interface: &TypeRc, implementation: &TypeRc) {
        self.implementations
            .insert(interface.token, implementation.clone());
    }

    /// The type actually instantiated when `ty` is requested
    pub fn resolve_type(&self, ty: &TypeRc) -> TypeRc {
        self.implementations
            .get(&ty.token)
            .map_or_else(|| ty.clone(), |bound| bound.value().clone())
    }

    fn find_constructor(&self, ty: &TypeRc, arg_types: &[TypeRc]) -> Result<ConstructorRc> {
        for (_, constructor) in ty.constructors.iter() {
            if constructor.param_count() != arg_types.len() {
                continue;
            }
            let mut matches = true;
            for (param, expected) in constructor.params.iter().zip(arg_types) {
                if param.erasure(&self.registry)?.token != expected.token {
                    matches = false;
                    break;
                }
            }
            if matches {
                return Ok(constructor.clone());
            }
        }

        if arg_types.is_empty() {
            Err(MissingDefaultConstructor(ty.fullname()))
        } else {
            Err(NoSuchConstructor {
                type_name: ty.fullname(),
                arg_types: join_types(arg_types),
            })
        }
    }

    fn instantiate(&self, ty: &TypeRc, arg_types: &[TypeRc], args: &[Value]) -> Result<ObjectRc> {
        let constructor = self.find_constructor(ty, arg_types)?;
        with_escalation(self.policy.as_ref(), constructor.as_ref(), || {
            constructor.new_instance(args)
        })
    }
}

impl ObjectFactory for DefaultObjectFactory {
    fn create_with(&self, ty: &TypeRc, arg_types: &[TypeRc], args: &[Value]) -> Result<ObjectRc> {
        let target = self.resolve_type(ty);
        self.instantiate(&target, arg_types, args)
            .map_err(|cause: Error| Instantiation {
                type_name: target.fullname(),
                arg_types: join_types(arg_types),
                arg_values: args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
                cause: Box::new(cause),
            })
    }
}

fn join_types(types: &[TypeRc]) -> String {
    types
        .iter()
        .map(|ty| ty.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        member::{ConstructorBody, FieldRc, MemberFlags},
        typesystem::{GenericType, PrimitiveKind, TypeBuilder},
    };

    fn point(registry: &Arc<TypeRegistry>, flags: MemberFlags) -> TypeRc {
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let builder = TypeBuilder::class(registry.clone(), "geo", "Point")
            .field("x", &int, MemberFlags::PUBLIC)
            .field("y", &int, MemberFlags::PUBLIC);
        let fields: Vec<FieldRc> = builder
            .current()
            .fields
            .iter()
            .map(|(_, field)| field.clone())
            .collect();
        let init: ConstructorBody = Arc::new(move |object, args| {
            for (field, value) in fields.iter().zip(args) {
                object.store(field, value.clone())?;
            }
            Ok(())
        });
        builder
            .constructor(flags, Vec::new(), None)
            .constructor(
                flags,
                vec![GenericType::raw(&int), GenericType::raw(&int)],
                Some(init),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_default() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = point(&registry, MemberFlags::PUBLIC);
        let factory = DefaultObjectFactory::new(registry);

        let object = factory.create(&ty).unwrap();
        assert_eq!(object.runtime_type().token, ty.token);
        assert_eq!(object.load(&ty.fields.get(0).unwrap()).unwrap(), Value::I4(0));
    }

    #[test]
    fn test_create_with_arguments() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = point(&registry, MemberFlags::PUBLIC);
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let factory = DefaultObjectFactory::new(registry);

        let object = factory
            .create_with(&ty, &[int.clone(), int], &[Value::I4(3), Value::I4(4)])
            .unwrap();
        assert_eq!(object.load(&ty.fields.get(1).unwrap()).unwrap(), Value::I4(4));
    }

    #[test]
    fn test_private_constructor_escalation() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = point(&registry, MemberFlags::PRIVATE);

        let restricted = DefaultObjectFactory::new(registry.clone())
            .with_access_policy(Arc::new(StaticAccess(false)));
        match restricted.create(&ty) {
            Err(Instantiation { cause, .. }) => {
                assert!(matches!(*cause, Error::AccessDenied { .. }));
            }
            other => panic!("expected instantiation failure, got {other:?}"),
        }

        let factory = DefaultObjectFactory::new(registry);
        assert!(factory.create(&ty).is_ok());
    }

    #[test]
    fn test_instantiation_error_message() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = point(&registry, MemberFlags::PUBLIC);
        let string = registry.string().unwrap();
        let factory = DefaultObjectFactory::new(registry);

        let error = factory
            .create_with(&ty, &[string], &[Value::from("origin")])
            .unwrap_err();
        assert!(matches!(
            &error,
            Instantiation { cause, .. } if matches!(**cause, NoSuchConstructor { .. })
        ));
        assert!(error
            .to_string()
            .starts_with("Error instantiating 'geo.Point' with invalid types (String) or values (origin)"));
    }

    #[test]
    fn test_interface_binding() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let shape = TypeBuilder::interface(registry.clone(), "geo", "Shape")
            .build()
            .unwrap();
        let circle = TypeBuilder::class(registry.clone(), "geo", "Circle")
            .implements(&shape)
            .default_constructor()
            .build()
            .unwrap();
        let factory = DefaultObjectFactory::new(registry);

        assert!(matches!(
            factory.create(&shape),
            Err(Instantiation { cause, .. }) if matches!(*cause, MissingDefaultConstructor(_))
        ));

        factory.bind(&shape, &circle);
        let object = factory.create(&shape).unwrap();
        assert_eq!(object.runtime_type().token, circle.token);
    }
}
