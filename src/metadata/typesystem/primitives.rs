//! Built-in primitive types of the host type model.
//!
//! The [`TypeRegistry`](crate::metadata::typesystem::TypeRegistry) registers one
//! [`RuntimeType`](crate::metadata::typesystem::RuntimeType) per [`PrimitiveKind`] when it is
//! created, using the fixed tokens returned by [`PrimitiveKind::token`].

use strum::{EnumCount, EnumIter};

use crate::metadata::{token::Token, typesystem::TypeFlavor};

/// Represents all built-in types (without data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.Object - root of all reference types
    Object,
    /// System.String - immutable string
    String,
}

impl PrimitiveKind {
    /// Get the token for this type
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(
            Token::PRIMITIVE_TABLE,
            match self {
                PrimitiveKind::Void => 0x01,
                PrimitiveKind::Boolean => 0x02,
                PrimitiveKind::Char => 0x03,
                PrimitiveKind::I1 => 0x04,
                PrimitiveKind::I2 => 0x06,
                PrimitiveKind::I4 => 0x08,
                PrimitiveKind::I8 => 0x0A,
                PrimitiveKind::R4 => 0x0C,
                PrimitiveKind::R8 => 0x0D,
                PrimitiveKind::Object => 0x10,
                PrimitiveKind::String => 0x11,
            },
        )
    }

    /// Namespace of all primitive types
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Simple name of the primitive type
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::String => "String",
        }
    }

    /// The flavor a type of this kind carries
    #[must_use]
    pub fn to_flavor(&self) -> TypeFlavor {
        match self {
            PrimitiveKind::Void => TypeFlavor::Void,
            PrimitiveKind::Boolean => TypeFlavor::Boolean,
            PrimitiveKind::Char => TypeFlavor::Char,
            PrimitiveKind::I1 => TypeFlavor::I1,
            PrimitiveKind::I2 => TypeFlavor::I2,
            PrimitiveKind::I4 => TypeFlavor::I4,
            PrimitiveKind::I8 => TypeFlavor::I8,
            PrimitiveKind::R4 => TypeFlavor::R4,
            PrimitiveKind::R8 => TypeFlavor::R8,
            PrimitiveKind::Object => TypeFlavor::Object,
            PrimitiveKind::String => TypeFlavor::String,
        }
    }

    /// Check if this is a value type (stored inline, not by reference)
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.to_flavor().is_value_type()
    }
}
