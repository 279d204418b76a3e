//! Dynamic values and object instances of the host type model.
//!
//! An [`Object`] is an instance of a class [`RuntimeType`]: one storage slot per instance field
//! declared anywhere in its class chain, keyed by the field's token so that a field shadowed by
//! a subclass keeps its own slot. Slots are written through [`Object::store`] and read through
//! [`Object::load`]; those are the raw storage operations member bodies use. Access-checked
//! access goes through [`crate::metadata::member::Field`].

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use crate::{
    metadata::{
        member::{Accessible, Field},
        token::Token,
        typesystem::{RuntimeType, TypeFlavor, TypeRc, MAX_HIERARCHY_DEPTH},
    },
    Error::{LockError, TargetMismatch},
    Result,
};

/// Reference to an `Object`
pub type ObjectRc = Arc<Object>;

/// A dynamically typed value.
///
/// No conversion is ever performed between variants; a field or accessor stores whatever value
/// it is handed.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The null reference
    #[default]
    Null,
    /// A boolean
    Boolean(bool),
    /// A character
    Char(char),
    /// A 32-bit (or narrower) signed integer
    I4(i32),
    /// A 64-bit signed integer
    I8(i64),
    /// A floating point number
    R8(f64),
    /// A string
    String(String),
    /// A reference to an object instance
    Object(ObjectRc),
}

impl Value {
    /// The initial value of a slot declared with type `ty`: zero or `false` for value
    /// primitives, null for everything else.
    #[must_use]
    pub fn default_for(ty: Option<&RuntimeType>) -> Self {
        match ty.map(|t| t.flavor) {
            Some(TypeFlavor::Boolean) => Value::Boolean(false),
            Some(TypeFlavor::Char) => Value::Char('\0'),
            Some(TypeFlavor::I1 | TypeFlavor::I2 | TypeFlavor::I4) => Value::I4(0),
            Some(TypeFlavor::I8) => Value::I8(0),
            Some(TypeFlavor::R4 | TypeFlavor::R8) => Value::R8(0.0),
            _ => Value::Null,
        }
    }

    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean payload
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer payload of [`Value::I4`]
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I4(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer payload of [`Value::I4`] or [`Value::I8`]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I4(value) => Some(i64::from(*value)),
            Value::I8(value) => Some(*value),
            _ => None,
        }
    }

    /// The floating point payload
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::R8(value) => Some(*value),
            _ => None,
        }
    }

    /// The string payload
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// The object payload
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRc> {
        match self {
            Value::Object(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I4(a), Value::I4(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::R8(a), Value::R8(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I4(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I8(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::R8(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectRc> for Value {
    fn from(value: ObjectRc) -> Self {
        Value::Object(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::I4(value) => write!(f, "{value}"),
            Value::I8(value) => write!(f, "{value}"),
            Value::R8(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::Object(object) => write!(f, "{}@{}", object.ty.fullname(), object.ty.token),
        }
    }
}

/// An instance of a class type.
pub struct Object {
    ty: TypeRc,
    slots: RwLock<HashMap<Token, Value>>,
}

impl Object {
    /// Allocate an instance of `ty` with every instance field of its class chain set to its
    /// default value. No constructor runs.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the class chain of `ty` is too deep.
    pub fn new(ty: &TypeRc) -> Result<ObjectRc> {
        let mut slots = HashMap::new();
        for class in ty.class_chain(MAX_HIERARCHY_DEPTH)? {
            for (_, field) in class.fields.iter() {
                if field.is_static() {
                    continue;
                }
                let declared = field.field_type.raw_type();
                slots.insert(field.token, Value::default_for(declared.as_deref()));
            }
        }

        Ok(Arc::new(Object {
            ty: ty.clone(),
            slots: RwLock::new(slots),
        }))
    }

    /// The runtime type this object was allocated for
    pub fn runtime_type(&self) -> &TypeRc {
        &self.ty
    }

    /// Read the raw storage of `field`, bypassing access checks.
    ///
    /// Static fields are read from the field itself.
    ///
    /// # Errors
    /// Returns [`crate::Error::TargetMismatch`] if this object has no slot for `field`.
    pub fn load(&self, field: &Field) -> Result<Value> {
        if field.is_static() {
            return field.load_static();
        }

        let slots = self.slots.read().map_err(|_| LockError)?;
        slots
            .get(&field.token)
            .cloned()
            .ok_or_else(|| self.mismatch(field))
    }

    /// Overwrite the raw storage of `field`, bypassing access checks.
    ///
    /// # Errors
    /// Returns [`crate::Error::TargetMismatch`] if this object has no slot for `field`.
    pub fn store(&self, field: &Field, value: Value) -> Result<()> {
        if field.is_static() {
            return field.store_static(value);
        }

        let mut slots = self.slots.write().map_err(|_| LockError)?;
        match slots.get_mut(&field.token) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.mismatch(field)),
        }
    }

    fn mismatch(&self, field: &Field) -> crate::Error {
        TargetMismatch {
            member: field.name.clone(),
            expected: field
                .declaring_type()
                .map_or_else(|| "<dropped>".to_string(), |t| t.fullname()),
            actual: self.ty.fullname(),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.ty.fullname())
            .finish_non_exhaustive()
    }
}
