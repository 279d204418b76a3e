// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # propscope
//!
//! Cached, name-based property access for runtime types.
//!
//! For every runtime type it is asked about, `propscope` builds a table of named properties
//! derived from the type's accessor methods and fields, and caches it. Higher-level code can
//! then read or write a property by name without introspecting the type again.
//!
//! ## Features
//!
//! - **Accessor resolution** - `is`/`get`/`set` naming conventions, covariant overrides,
//!   overloaded setters and field fallback reconciled into one deterministic mapping per type
//! - **Concurrent cache** - One table per type, shared across threads, with an on/off switch
//! - **Privilege escalation** - Non-public members are retried once with access checks
//!   suppressed, if the configured policy allows it
//! - **Property paths** - Tokenizer and navigator for expressions like `orders[0].items[2].sku`
//! - **Case-insensitive lookup** - `USERNAME` finds `userName`
//!
//! ## Quick Start
//!
//! ```rust
//! use propscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let account = TypeBuilder::class(registry.clone(), "bank", "Account")
//!     .property("owner", &registry.string()?)
//!     .property("active", &registry.boolean()?)
//!     .default_constructor()
//!     .build()?;
//!
//! let factory = ReflectorFactory::new(registry.clone());
//! let reflector = factory.find_for_type(&account)?;
//! assert_eq!(reflector.readable_property_names(), ["owner", "active"]);
//! assert_eq!(reflector.find_property_name("OWNER"), Some("owner"));
//!
//! let instance = DefaultObjectFactory::new(registry).create(&account)?;
//! reflector.set_invoker("active")?.invoke(&instance, &[Value::from(true)])?;
//! assert_eq!(reflector.get_invoker("active")?.invoke(&instance, &[])?, Value::from(true));
//! # Ok::<(), propscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `propscope` is organized into two modules:
//!
//! - [`metadata`] - The host type model: types, members, values and their registry
//! - [`reflection`] - Accessor resolution, caching, path navigation and the thin construction
//!   and copy helpers built on top
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (reflector construction and
//! privilege escalation at `debug`, cache hits and skipped field copies at `trace`). It never
//! installs a subscriber.
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use propscope::prelude::*;
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let factory = ReflectorFactory::new(registry.clone());
/// let reflector = factory.find_for_type(&registry.string()?)?;
/// assert!(reflector.readable_property_names().is_empty());
/// # Ok::<(), propscope::Error>(())
/// ```
pub mod prelude;

/// The host type model introspected by [`reflection`]
///
/// # Key Components
///
/// - [`metadata::typesystem`] - Runtime types, the type registry and the type builder
/// - [`metadata::member`] - Fields, methods and constructors with access checks
/// - [`metadata::value`] - Dynamic values and object instances
/// - [`metadata::token`] - Identities of types and members
pub mod metadata;

/// Property accessor resolution, caching and navigation
///
/// # Key Components
///
/// - [`reflection::ReflectorFactory`] - Memoizing source of reflectors
/// - [`reflection::Reflector`] - Property table of one type
/// - [`reflection::PropertyTokenizer`] - Compound property path tokenizer
/// - [`reflection::MetaType`] - Compound property path navigation
pub mod reflection;

/// `propscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `propscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use propscope::{Error, prelude::*};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let factory = ReflectorFactory::new(registry.clone());
///
/// match factory.find_for_type(&registry.object()?)?.default_constructor() {
///     Ok(_) => println!("constructible"),
///     Err(Error::MissingDefaultConstructor(name)) => assert_eq!(name, "System.Object"),
///     Err(e) => println!("Error: {}", e),
/// }
/// # Ok::<(), propscope::Error>(())
/// ```
pub use error::{Error, PropertyAccess};
