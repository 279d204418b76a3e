//! Host type model introspected by the reflection layer.
//!
//! This module contains the runtime type descriptors, their declared members and the dynamic
//! values those members read and write. It plays the part of a managed runtime's native
//! introspection facility: everything the accessor-resolution engine in [`crate::reflection`]
//! needs is expressed through it.
//!
//! # Key Components
//!
//! - [`token`] - 32-bit identities shared by types and members
//! - [`typesystem`] - Types, their hierarchy, the registry and the type builder
//! - [`member`] - Fields, methods and constructors with access checks
//! - [`value`] - Dynamic values and object instances
//!
//! # Examples
//!
//! ```rust
//! use propscope::metadata::{typesystem::{TypeBuilder, TypeRegistry}, value::Object};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let person = TypeBuilder::class(registry.clone(), "demo", "Person")
//!     .property("name", &registry.string()?)
//!     .build()?;
//!
//! let instance = Object::new(&person)?;
//! assert_eq!(instance.runtime_type().fullname(), "demo.Person");
//! # Ok::<(), propscope::Error>(())
//! ```

/// Fields, methods and constructors
pub mod member;
/// Identity of types and members
pub mod token;
/// Runtime types, their registry and builder
pub mod typesystem;
/// Dynamic values and object instances
pub mod value;
