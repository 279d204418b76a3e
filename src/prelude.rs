//! # propscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the propscope library. Import this module to get quick access to the essential
//! types for defining runtime types and accessing their properties by name.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all propscope operations
pub use crate::Error;

/// The result type used throughout propscope
pub use crate::Result;

/// Read or write side of a property lookup
pub use crate::PropertyAccess;

// ================================================================================================
// Type Model
// ================================================================================================

/// Identity of types and members
pub use crate::metadata::token::Token;

/// Runtime types and their registry
pub use crate::metadata::typesystem::{
    GenericType, PrimitiveKind, RuntimeType, TypeBuilder, TypeFlavor, TypeRc, TypeRegistry,
};

/// Declared members
pub use crate::metadata::member::{
    Accessible, Constructor, ConstructorBody, Field, MemberFlags, Method, MethodBody,
};

/// Dynamic values and instances
pub use crate::metadata::value::{Object, ObjectRc, Value};

// ================================================================================================
// Reflection
// ================================================================================================

/// Reflector cache and property tables
pub use crate::reflection::{Reflector, ReflectorConfig, ReflectorFactory};

/// Property accessors and privilege escalation
pub use crate::reflection::{AccessPolicy, Invoker, InvokerRc, StaticAccess};

/// Property paths
pub use crate::reflection::{MetaType, PropertyTokenizer};

/// Construction and copy
pub use crate::reflection::{DefaultObjectFactory, ObjectFactory, PropertyCopier};
