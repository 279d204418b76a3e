//! Member flags and supporting types shared by fields, methods and constructors.
//!
//! # Key Types
//! - [`MemberFlags`]: Visibility, storage and synthesis flags
//! - [`MethodBody`], [`ConstructorBody`]: Implementations supplied by the host
//! - [`Accessible`]: The per-member "suppress access checks" switch used for privilege escalation

use std::sync::Arc;

use bitflags::bitflags;

use crate::{
    metadata::{
        typesystem::TypeRc,
        value::{ObjectRc, Value},
    },
    Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Member attribute flags
    pub struct MemberFlags: u32 {
        /// Accessible by anyone
        const PUBLIC = 0x0001;
        /// Accessible only by the declaring type
        const PRIVATE = 0x0002;
        /// Accessible by the declaring type and sub-types
        const PROTECTED = 0x0004;
        /// Defined on the type, else per instance
        const STATIC = 0x0008;
        /// Field cannot be reassigned / method cannot be overridden
        const FINAL = 0x0010;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0020;
        /// Member was generated by the compiler
        const SYNTHETIC = 0x0040;
        /// Compiler generated forwarder implementing a covariant override
        const BRIDGE = 0x0080;
    }
}

impl MemberFlags {
    /// Check if the member is visible without escalation
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.contains(MemberFlags::PUBLIC)
    }

    /// Check if the member is both static and final, i.e. a compile-time constant slot
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.contains(MemberFlags::STATIC | MemberFlags::FINAL)
    }
}

/// Implementation of a method: receives the target and the arguments, returns the result
/// ([`Value::Null`] for `void`).
pub type MethodBody = Arc<dyn Fn(&ObjectRc, &[Value]) -> Result<Value> + Send + Sync>;

/// Implementation of a constructor: initializes a freshly allocated instance.
pub type ConstructorBody = Arc<dyn Fn(&ObjectRc, &[Value]) -> Result<()> + Send + Sync>;

/// A member whose access checks can be suppressed.
///
/// Suppression is a one-way, idempotent widening: setting the flag twice from racing threads
/// is harmless.
pub trait Accessible: Send + Sync {
    /// Name of the member
    fn member_name(&self) -> &str;

    /// The type declaring the member, if it is still alive
    fn declaring_type(&self) -> Option<TypeRc>;

    /// Whether access checks are currently suppressed for this member
    fn is_accessible(&self) -> bool;

    /// Suppress (or re-enable) access checks for this member
    fn set_accessible(&self, flag: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_flags() {
        let constant = MemberFlags::PUBLIC | MemberFlags::STATIC | MemberFlags::FINAL;
        assert!(constant.is_constant());
        assert!(constant.is_public());

        let private_final = MemberFlags::PRIVATE | MemberFlags::FINAL;
        assert!(!private_final.is_constant());
        assert!(!private_final.is_public());
    }
}
