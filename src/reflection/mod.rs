//! Property accessor resolution and caching.
//!
//! This module turns runtime types into tables of named properties, so that callers can read
//! and write a property by name without introspecting the type on every access.
//!
//! # Key Components
//!
//! - [`ReflectorFactory`] - Concurrent, memoizing source of reflectors
//! - [`Reflector`] - The property table of one type
//! - [`Invoker`] - Read or write accessor of one property
//! - [`PropertyTokenizer`] - Splits paths like `orders[0].items[2].sku`
//! - [`MetaType`] - Resolves such paths across nested types
//! - [`namer`] - Accessor naming conventions
//! - [`DefaultObjectFactory`], [`PropertyCopier`] - Construction and field copy
//!
//! # Examples
//!
//! ```rust
//! use propscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let user = TypeBuilder::class(registry.clone(), "demo", "User")
//!     .property("userName", &registry.string()?)
//!     .default_constructor()
//!     .build()?;
//!
//! let factory = ReflectorFactory::new(registry.clone());
//! let reflector = factory.find_for_type(&user)?;
//! let instance = DefaultObjectFactory::new(registry).create(&user)?;
//!
//! reflector.set_invoker("userName")?.invoke(&instance, &[Value::from("ada")])?;
//! let name = reflector.get_invoker("userName")?.invoke(&instance, &[])?;
//! assert_eq!(name.as_str(), Some("ada"));
//! # Ok::<(), propscope::Error>(())
//! ```

pub mod access;
mod config;
mod copier;
mod factory;
pub mod invoker;
mod meta;
pub mod namer;
mod object_factory;
mod reflector;
mod tokenizer;

pub use access::{AccessPolicy, StaticAccess};
pub use config::ReflectorConfig;
pub use copier::PropertyCopier;
pub use factory::ReflectorFactory;
pub use invoker::{GetFieldInvoker, Invoker, InvokerRc, MethodInvoker, SetFieldInvoker};
pub use meta::MetaType;
pub use object_factory::{DefaultObjectFactory, ObjectFactory};
pub use reflector::Reflector;
pub use tokenizer::{PropertyTokenizer, Segments};
