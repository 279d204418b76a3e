//! Identity tokens for types and members of the host type model.
//!
//! Every [`crate::metadata::typesystem::RuntimeType`] and every member carries a [`Token`]. Two
//! descriptors are the same entity exactly when their tokens are equal, which is what the
//! reflector cache keys on.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A token identifying a type or member.
///
/// The high byte (bits 24-31) names the kind of entity (see the `*_TABLE` constants), the low
/// 24 bits are a row number allocated by the [`crate::metadata::typesystem::TypeRegistry`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table byte of user defined types
    pub const TYPE_TABLE: u8 = 0x02;
    /// Table byte of fields
    pub const FIELD_TABLE: u8 = 0x04;
    /// Table byte of methods
    pub const METHOD_TABLE: u8 = 0x06;
    /// Table byte of constructors
    pub const CONSTRUCTOR_TABLE: u8 = 0x07;
    /// Table byte of constructed array types
    pub const ARRAY_TABLE: u8 = 0x1B;
    /// Table byte of the built-in primitive types
    pub const PRIMITIVE_TABLE: u8 = 0xF0;
    /// Largest row number a token can carry
    pub const MAX_ROW: u32 = 0x00FF_FFFF;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table byte and a row number
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & Self::MAX_ROW))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & Self::MAX_ROW
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
