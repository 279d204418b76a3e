use std::sync::{Arc, Weak};

use crate::metadata::{
    token::Token,
    typesystem::{PrimitiveKind, RuntimeType, TypeRc},
};

/// A vector that holds `TypeRef` instances (weak references)
pub type TypeRefList = Arc<boxcar::Vec<TypeRef>>;

/// A smart reference to a `RuntimeType` that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API
#[derive(Clone, Debug)]
pub struct TypeRef {
    weak_ref: Weak<RuntimeType>,
}

impl TypeRef {
    /// Create a new `TypeRef` from a strong reference
    pub fn new(strong_ref: &TypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Get the full name of the referenced type (if still alive)
    #[must_use]
    pub fn fullname(&self) -> Option<String> {
        self.upgrade().map(|t| t.fullname())
    }
}

impl From<TypeRc> for TypeRef {
    fn from(strong_ref: TypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl From<&TypeRc> for TypeRef {
    fn from(strong_ref: &TypeRc) -> Self {
        Self::new(strong_ref)
    }
}

#[allow(missing_docs)]
/// The shape of a runtime type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    // Built-in primitives
    Void,
    Boolean,
    Char,
    I1,
    I2,
    I4,
    I8,
    R4,
    R8,
    /// The root of every reference type
    Object,
    String,

    // User defined and constructed types
    Class,
    Interface,
    Array,
}

impl TypeFlavor {
    /// Check if this is one of the built-in primitives (including `Object` and `String`)
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.to_primitive_kind().is_some()
    }

    /// Check if values of this flavor are stored inline rather than by reference.
    ///
    /// Value primitives never take part in subtyping: they are only assignable to themselves.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Void
                | TypeFlavor::Boolean
                | TypeFlavor::Char
                | TypeFlavor::I1
                | TypeFlavor::I2
                | TypeFlavor::I4
                | TypeFlavor::I8
                | TypeFlavor::R4
                | TypeFlavor::R8
        )
    }

    /// Check if this is a reference type
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }

    /// Try to convert to a `PrimitiveKind` if this is a primitive type
    #[must_use]
    pub fn to_primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeFlavor::Void => Some(PrimitiveKind::Void),
            TypeFlavor::Boolean => Some(PrimitiveKind::Boolean),
            TypeFlavor::Char => Some(PrimitiveKind::Char),
            TypeFlavor::I1 => Some(PrimitiveKind::I1),
            TypeFlavor::I2 => Some(PrimitiveKind::I2),
            TypeFlavor::I4 => Some(PrimitiveKind::I4),
            TypeFlavor::I8 => Some(PrimitiveKind::I8),
            TypeFlavor::R4 => Some(PrimitiveKind::R4),
            TypeFlavor::R8 => Some(PrimitiveKind::R8),
            TypeFlavor::Object => Some(PrimitiveKind::Object),
            TypeFlavor::String => Some(PrimitiveKind::String),
            TypeFlavor::Class | TypeFlavor::Interface | TypeFlavor::Array => None,
        }
    }
}

impl From<PrimitiveKind> for TypeFlavor {
    fn from(kind: PrimitiveKind) -> Self {
        kind.to_flavor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_value_types() {
        assert!(TypeFlavor::Boolean.is_value_type());
        assert!(TypeFlavor::I4.is_value_type());
        assert!(TypeFlavor::Void.is_value_type());
        assert!(!TypeFlavor::String.is_value_type());
        assert!(!TypeFlavor::Object.is_value_type());
        assert!(!TypeFlavor::Array.is_value_type());
        assert!(TypeFlavor::Interface.is_reference_type());
    }

    #[test]
    fn test_flavor_primitive_kind_roundtrip() {
        assert_eq!(
            TypeFlavor::Boolean.to_primitive_kind(),
            Some(PrimitiveKind::Boolean)
        );
        assert_eq!(TypeFlavor::Class.to_primitive_kind(), None);
        assert!(TypeFlavor::Object.is_primitive());
        assert!(!TypeFlavor::Array.is_primitive());
        assert_eq!(TypeFlavor::from(PrimitiveKind::R8), TypeFlavor::R8);
    }

    #[test]
    fn test_type_ref_weak() {
        let ty = Arc::new(RuntimeType::new(
            Token::from_parts(Token::TYPE_TABLE, 1),
            TypeFlavor::Class,
            "demo".to_string(),
            "Thing".to_string(),
        ));
        let type_ref = TypeRef::new(&ty);
        assert!(type_ref.is_valid());
        assert_eq!(type_ref.token(), Some(ty.token));
        assert_eq!(type_ref.fullname().as_deref(), Some("demo.Thing"));

        drop(ty);
        assert!(!type_ref.is_valid());
        assert!(type_ref.upgrade().is_none());
    }
}
