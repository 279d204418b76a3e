//! Fields, methods and constructors declared by runtime types.
//!
//! Members are the host's native introspection and invocation primitives: they know their
//! declared types, enforce their own access checks and carry the per-member switch that
//! privilege escalation flips (see [`Accessible`]).
//!
//! # Access Rules
//!
//! - non-public members refuse access until [`Accessible::set_accessible`] was called
//! - `final` instance fields refuse writes until made accessible
//! - `static final` fields refuse writes unconditionally
//!
//! Refusals are reported as [`crate::Error::AccessDenied`].

mod types;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

pub use types::{Accessible, ConstructorBody, MemberFlags, MethodBody};

use crate::{
    metadata::{
        token::Token,
        typesystem::{GenericType, TypeRc, TypeRef},
        value::{Object, ObjectRc, Value},
    },
    Error::{self, AbstractMember, AccessDenied, ArgumentCount, LockError, TargetMismatch},
    Result,
};

/// Reference to a `Field`
pub type FieldRc = Arc<Field>;
/// A vector that holds a list of `Field`
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
/// Reference to a `Method`
pub type MethodRc = Arc<Method>;
/// A vector that holds a list of `Method`
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;
/// Reference to a `Constructor`
pub type ConstructorRc = Arc<Constructor>;
/// A vector that holds a list of `Constructor`
pub type ConstructorList = Arc<boxcar::Vec<ConstructorRc>>;

fn access_denied(member: &str, declaring: &TypeRef) -> Error {
    AccessDenied {
        member: member.to_string(),
        type_name: declaring
            .fullname()
            .unwrap_or_else(|| "<dropped>".to_string()),
    }
}

fn check_target(member: &str, declaring: &TypeRef, target: &ObjectRc) -> Result<()> {
    if let Some(declaring) = declaring.upgrade() {
        if !declaring.is_assignable_from(target.runtime_type()) {
            return Err(TargetMismatch {
                member: member.to_string(),
                expected: declaring.fullname(),
                actual: target.runtime_type().fullname(),
            });
        }
    }
    Ok(())
}

/// A field: a direct storage slot, per instance or (if `STATIC`) per type.
pub struct Field {
    /// Token
    pub token: Token,
    /// Field name
    pub name: String,
    /// Attribute flags
    pub flags: MemberFlags,
    /// Declared type
    pub field_type: GenericType,
    declaring: TypeRef,
    accessible: AtomicBool,
    static_value: RwLock<Value>,
}

impl Field {
    /// Create a new field declared by `declaring`
    pub fn new(
        token: Token,
        name: &str,
        field_type: GenericType,
        flags: MemberFlags,
        declaring: &TypeRc,
    ) -> Self {
        let initial = Value::default_for(field_type.raw_type().as_deref());
        Field {
            token,
            name: name.to_string(),
            flags,
            field_type,
            declaring: TypeRef::new(declaring),
            accessible: AtomicBool::new(false),
            static_value: RwLock::new(initial),
        }
    }

    /// Is this a per-type field
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    /// Is this field read-only after construction
    pub fn is_final(&self) -> bool {
        self.flags.contains(MemberFlags::FINAL)
    }

    /// Read the field of `target`, subject to access checks.
    ///
    /// # Errors
    /// Returns [`crate::Error::AccessDenied`] if the field is not public and not accessible, or
    /// [`crate::Error::TargetMismatch`] if `target` has no such field.
    pub fn get(&self, target: &ObjectRc) -> Result<Value> {
        if !self.flags.is_public() && !self.is_accessible() {
            return Err(access_denied(&self.name, &self.declaring));
        }
        target.load(self)
    }

    /// Write the field of `target`, subject to access checks.
    ///
    /// # Errors
    /// Returns [`crate::Error::AccessDenied`] if the field is `static final`, or is `final` or
    /// non-public and not accessible; [`crate::Error::TargetMismatch`] if `target` has no such
    /// field.
    pub fn set(&self, target: &ObjectRc, value: Value) -> Result<()> {
        if self.flags.is_constant() {
            return Err(access_denied(&self.name, &self.declaring));
        }
        if (self.is_final() || !self.flags.is_public()) && !self.is_accessible() {
            return Err(access_denied(&self.name, &self.declaring));
        }
        target.store(self, value)
    }

    pub(crate) fn load_static(&self) -> Result<Value> {
        Ok(self.static_value.read().map_err(|_| LockError)?.clone())
    }

    pub(crate) fn store_static(&self, value: Value) -> Result<()> {
        *self.static_value.write().map_err(|_| LockError)? = value;
        Ok(())
    }
}

impl Accessible for Field {
    fn member_name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        self.declaring.upgrade()
    }

    fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    fn set_accessible(&self, flag: bool) {
        self.accessible.store(flag, Ordering::Release);
    }
}

/// A method with an optional host supplied implementation.
pub struct Method {
    /// Token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Attribute flags
    pub flags: MemberFlags,
    /// Declared return type, `System.Void` for none
    pub return_type: GenericType,
    /// Declared parameter types
    pub params: Vec<GenericType>,
    declaring: TypeRef,
    body: Option<MethodBody>,
    accessible: AtomicBool,
}

impl Method {
    /// Create a new method declared by `declaring`
    pub fn new(
        token: Token,
        name: &str,
        flags: MemberFlags,
        return_type: GenericType,
        params: Vec<GenericType>,
        body: Option<MethodBody>,
        declaring: &TypeRc,
    ) -> Self {
        Method {
            token,
            name: name.to_string(),
            flags,
            return_type,
            params,
            declaring: TypeRef::new(declaring),
            body,
            accessible: AtomicBool::new(false),
        }
    }

    /// Number of declared parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Is this a compiler generated covariant-override forwarder
    pub fn is_bridge(&self) -> bool {
        self.flags.contains(MemberFlags::BRIDGE)
    }

    /// Invoke the method on `target`, subject to access checks.
    ///
    /// # Errors
    /// Returns [`crate::Error::AccessDenied`] if the method is not public and not accessible,
    /// [`crate::Error::ArgumentCount`], [`crate::Error::TargetMismatch`],
    /// [`crate::Error::AbstractMember`] for methods without body, or whatever the body returns.
    pub fn invoke(&self, target: &ObjectRc, args: &[Value]) -> Result<Value> {
        if !self.flags.is_public() && !self.is_accessible() {
            return Err(access_denied(&self.name, &self.declaring));
        }
        if args.len() != self.params.len() {
            return Err(ArgumentCount {
                member: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        if !self.flags.contains(MemberFlags::STATIC) {
            check_target(&self.name, &self.declaring, target)?;
        }

        match &self.body {
            Some(body) => body(target, args),
            None => Err(AbstractMember(self.name.clone())),
        }
    }
}

impl Accessible for Method {
    fn member_name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        self.declaring.upgrade()
    }

    fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    fn set_accessible(&self, flag: bool) {
        self.accessible.store(flag, Ordering::Release);
    }
}

/// A constructor: allocates an instance of its declaring type and runs an optional initializer.
pub struct Constructor {
    /// Token
    pub token: Token,
    /// Attribute flags
    pub flags: MemberFlags,
    /// Declared parameter types
    pub params: Vec<GenericType>,
    declaring: TypeRef,
    body: Option<ConstructorBody>,
    accessible: AtomicBool,
}

impl Constructor {
    /// Name reported for constructors in errors
    pub const NAME: &'static str = ".ctor";

    /// Create a new constructor declared by `declaring`
    pub fn new(
        token: Token,
        flags: MemberFlags,
        params: Vec<GenericType>,
        body: Option<ConstructorBody>,
        declaring: &TypeRc,
    ) -> Self {
        Constructor {
            token,
            flags,
            params,
            declaring: TypeRef::new(declaring),
            body,
            accessible: AtomicBool::new(false),
        }
    }

    /// Number of declared parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Allocate and initialize a new instance, subject to access checks.
    ///
    /// # Errors
    /// Returns [`crate::Error::AccessDenied`] if the constructor is not public and not
    /// accessible, [`crate::Error::ArgumentCount`], [`crate::Error::AbstractMember`] for
    /// interfaces, or whatever the initializer returns.
    pub fn new_instance(&self, args: &[Value]) -> Result<ObjectRc> {
        if !self.flags.is_public() && !self.is_accessible() {
            return Err(access_denied(Self::NAME, &self.declaring));
        }
        if args.len() != self.params.len() {
            return Err(ArgumentCount {
                member: Self::NAME.to_string(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }

        let ty = self
            .declaring
            .upgrade()
            .ok_or_else(|| malformed_error!("Declaring type of constructor has been dropped"))?;
        if ty.is_interface() || self.flags.contains(MemberFlags::ABSTRACT) {
            return Err(AbstractMember(format!("{}::{}", ty.fullname(), Self::NAME)));
        }

        let instance = Object::new(&ty)?;
        if let Some(body) = &self.body {
            body(&instance, args)?;
        }
        Ok(instance)
    }
}

impl Accessible for Constructor {
    fn member_name(&self) -> &str {
        Self::NAME
    }

    fn declaring_type(&self) -> Option<TypeRc> {
        self.declaring.upgrade()
    }

    fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    fn set_accessible(&self, flag: bool) {
        self.accessible.store(flag, Ordering::Release);
    }
}
