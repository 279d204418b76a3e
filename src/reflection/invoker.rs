//! Uniform read-or-write operations over fields and methods.
//!
//! A [`Reflector`](crate::reflection::Reflector) maps every property to one [`Invoker`]: a
//! [`MethodInvoker`] wrapping a getter or setter, or a [`GetFieldInvoker`] /
//! [`SetFieldInvoker`] wrapping a field that has no accessor method. All of them apply the
//! privilege-escalation fallback of [`crate::reflection::access`].

use std::sync::Arc;

use crate::{
    metadata::{
        member::{FieldRc, MethodRc},
        typesystem::TypeRc,
        value::{ObjectRc, Value},
    },
    reflection::access::{with_escalation, AccessPolicy},
    Error::ArgumentCount,
    Result,
};

/// Reference to an `Invoker`
pub type InvokerRc = Arc<dyn Invoker>;

/// A read or write operation on one member.
///
/// Invokers hold no state beyond the member and may be used concurrently against different
/// targets.
pub trait Invoker: Send + Sync {
    /// Perform the operation on `target`.
    ///
    /// Read accessors take no arguments and return the value; write accessors take the new
    /// value and return [`Value::Null`].
    ///
    /// # Errors
    /// Returns the member's failure, see [`crate::metadata::member`].
    fn invoke(&self, target: &ObjectRc, args: &[Value]) -> Result<Value>;

    /// The erased value type: the return type of a getter, the parameter type of a setter,
    /// the declared type of a field
    fn value_type(&self) -> &TypeRc;

    /// Name of the wrapped member
    fn member_name(&self) -> &str;
}

/// Calls an accessor method.
pub struct MethodInvoker {
    method: MethodRc,
    value_type: TypeRc,
    policy: Arc<dyn AccessPolicy>,
}

impl MethodInvoker {
    /// Create a new invoker for `method`
    ///
    /// ## Arguments
    /// * 'method'     - The getter or setter
    /// * 'value_type' - Erased return type (getter) or parameter type (setter)
    /// * 'policy'     - Escalation policy
    pub fn new(method: MethodRc, value_type: TypeRc, policy: Arc<dyn AccessPolicy>) -> Self {
        MethodInvoker {
            method,
            value_type,
            policy,
        }
    }

    /// The wrapped method
    pub fn method(&self) -> &MethodRc {
        &self.method
    }
}

impl Invoker for MethodInvoker {
    fn invoke(&self, target: &ObjectRc, args: &[Value]) -> Result<Value> {
        with_escalation(self.policy.as_ref(), self.method.as_ref(), || {
            self.method.invoke(target, args)
        })
    }

    fn value_type(&self) -> &TypeRc {
        &self.value_type
    }

    fn member_name(&self) -> &str {
        &self.method.name
    }
}

/// Reads a field directly.
pub struct GetFieldInvoker {
    field: FieldRc,
    value_type: TypeRc,
    policy: Arc<dyn AccessPolicy>,
}

impl GetFieldInvoker {
    /// Create a new read invoker for `field`
    ///
    /// ## Arguments
    /// * 'field'      - The field
    /// * 'value_type' - Erased field type
    /// * 'policy'     - Escalation policy
    pub fn new(field: FieldRc, value_type: TypeRc, policy: Arc<dyn AccessPolicy>) -> Self {
        GetFieldInvoker {
            field,
            value_type,
            policy,
        }
    }
}

impl Invoker for GetFieldInvoker {
    fn invoke(&self, target: &ObjectRc, _args: &[Value]) -> Result<Value> {
        with_escalation(self.policy.as_ref(), self.field.as_ref(), || {
            self.field.get(target)
        })
    }

    fn value_type(&self) -> &TypeRc {
        &self.value_type
    }

    fn member_name(&self) -> &str {
        &self.field.name
    }
}

/// Writes a field directly.
pub struct SetFieldInvoker {
    field: FieldRc,
    value_type: TypeRc,
    policy: Arc<dyn AccessPolicy>,
}

impl SetFieldInvoker {
    /// Create a new write invoker for `field`
    ///
    /// ## Arguments
    /// * 'field'      - The field
    /// * 'value_type' - Erased field type
    /// * 'policy'     - Escalation policy
    pub fn new(field: FieldRc, value_type: TypeRc, policy: Arc<dyn AccessPolicy>) -> Self {
        SetFieldInvoker {
            field,
            value_type,
            policy,
        }
    }
}

impl Invoker for SetFieldInvoker {
    fn invoke(&self, target: &ObjectRc, args: &[Value]) -> Result<Value> {
        let Some(value) = args.first() else {
            return Err(ArgumentCount {
                member: self.field.name.clone(),
                expected: 1,
                actual: 0,
            });
        };

        with_escalation(self.policy.as_ref(), self.field.as_ref(), || {
            self.field.set(target, value.clone())
        })?;
        Ok(Value::Null)
    }

    fn value_type(&self) -> &TypeRc {
        &self.value_type
    }

    fn member_name(&self) -> &str {
        &self.field.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            member::{Accessible, MemberFlags, MethodBody},
            typesystem::{PrimitiveKind, TypeBuilder, TypeRegistry},
            value::Object,
        },
        reflection::access::StaticAccess,
        Error,
    };

    fn allow() -> Arc<dyn AccessPolicy> {
        Arc::new(StaticAccess(true))
    }

    fn deny() -> Arc<dyn AccessPolicy> {
        Arc::new(StaticAccess(false))
    }

    #[test]
    fn test_field_invokers_escalate() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let ty = TypeBuilder::class(registry.clone(), "demo", "Counter")
            .field("count", &int, MemberFlags::PRIVATE)
            .build()
            .unwrap();
        let object = Object::new(&ty).unwrap();
        let field = ty.fields.get(0).unwrap().clone();

        let setter = SetFieldInvoker::new(field.clone(), int.clone(), allow());
        let getter = GetFieldInvoker::new(field.clone(), int.clone(), allow());
        assert_eq!(setter.invoke(&object, &[Value::I4(7)]).unwrap(), Value::Null);
        assert_eq!(getter.invoke(&object, &[]).unwrap(), Value::I4(7));
        assert_eq!(getter.value_type().token, int.token);
        assert_eq!(getter.member_name(), "count");
        assert!(field.is_accessible());
    }

    #[test]
    fn test_field_invoker_without_escalation() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let ty = TypeBuilder::class(registry.clone(), "demo", "Counter")
            .field("count", &int, MemberFlags::PRIVATE)
            .build()
            .unwrap();
        let object = Object::new(&ty).unwrap();
        let field = ty.fields.get(0).unwrap().clone();

        let getter = GetFieldInvoker::new(field.clone(), int.clone(), deny());
        assert!(matches!(
            getter.invoke(&object, &[]),
            Err(Error::AccessDenied { .. })
        ));

        let setter = SetFieldInvoker::new(field, int, deny());
        assert!(matches!(
            setter.invoke(&object, &[]),
            Err(Error::ArgumentCount { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_method_invoker() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let string = registry.string().unwrap();
        let body: MethodBody = Arc::new(|_, _| Ok(Value::from("hidden")));
        let ty = TypeBuilder::class(registry.clone(), "demo", "Vault")
            .method("getSecret", MemberFlags::PRIVATE, &string, vec![], Some(body))
            .build()
            .unwrap();
        let object = Object::new(&ty).unwrap();
        let method = ty.methods.get(0).unwrap().clone();

        let restricted = MethodInvoker::new(method.clone(), string.clone(), deny());
        assert!(matches!(
            restricted.invoke(&object, &[]),
            Err(Error::AccessDenied { .. })
        ));

        let invoker = MethodInvoker::new(method, string, allow());
        assert_eq!(invoker.invoke(&object, &[]).unwrap(), Value::from("hidden"));
        assert_eq!(invoker.member_name(), "getSecret");
        // escalation sticks to the member
        assert_eq!(restricted.invoke(&object, &[]).unwrap(), Value::from("hidden"));
    }
}
