//! Host type model used for accessor resolution.
//!
//! This module provides the runtime type descriptors the reflection layer introspects: named
//! types with a single base type, any number of implemented interfaces, and declared fields,
//! methods and constructors. It stands in for the native introspection facility of a host
//! environment and is all the accessor-resolution engine depends on.
//!
//! # Key Components
//!
//! - [`RuntimeType`]: Core type descriptor (identity, flavor, hierarchy, declared members)
//! - [`TypeRegistry`]: Owner of all types, pre-populated with the primitives and `System.Object`
//! - [`TypeBuilder`]: Fluent API for defining classes and interfaces
//! - [`GenericType`]: Declared member types and their erasure
//! - [`PrimitiveKind`]: Built-in primitive types
//!
//! # Type Hierarchy
//!
//! Every class (directly or indirectly) extends `System.Object`, the *root* type. Walks over the
//! ancestor chain stop at the root: it contributes no members to any accessor table.
//!
//! # Examples
//!
//! ```rust
//! use propscope::metadata::typesystem::{TypeBuilder, TypeRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let base = TypeBuilder::class(registry.clone(), "shop", "Entity")
//!     .property("id", &registry.string()?)
//!     .build()?;
//! let order = TypeBuilder::class(registry.clone(), "shop", "Order")
//!     .extends(&base)
//!     .build()?;
//!
//! assert!(base.is_assignable_from(&order));
//! assert_eq!(order.fullname(), "shop.Order");
//! # Ok::<(), propscope::Error>(())
//! ```

mod base;
mod builder;
mod generic;
mod primitives;
mod registry;

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, OnceLock},
};

pub use base::{TypeFlavor, TypeRef, TypeRefList};
pub use builder::TypeBuilder;
pub use generic::GenericType;
pub use primitives::PrimitiveKind;
pub use registry::TypeRegistry;

use crate::{
    metadata::{
        member::{ConstructorList, FieldList, MethodList},
        token::Token,
    },
    Error::RecursionLimit,
    Result,
};

/// Reference to a `RuntimeType`
pub type TypeRc = Arc<RuntimeType>;

/// Default bound for walks over the ancestor chain of a type
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Represents a runtime type: a primitive, a user defined class or interface, or a constructed
/// array type.
pub struct RuntimeType {
    /// Token
    pub token: Token,
    /// The `TypeFlavor`
    pub flavor: TypeFlavor,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// This types base aka 'extends'
    base: OnceLock<TypeRef>,
    /// Element type, only set for array types
    element: OnceLock<TypeRef>,
    /// All interfaces this type implements (or extends, for interfaces)
    pub interfaces: TypeRefList,
    /// All fields this type declares
    pub fields: FieldList,
    /// All methods this type declares
    pub methods: MethodList,
    /// All constructors this type declares
    pub constructors: ConstructorList,
}

impl RuntimeType {
    /// Create a new instance of a `RuntimeType` without base, interfaces or members
    pub fn new(token: Token, flavor: TypeFlavor, namespace: String, name: String) -> Self {
        RuntimeType {
            token,
            flavor,
            namespace,
            name,
            base: OnceLock::new(),
            element: OnceLock::new(),
            interfaces: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            constructors: Arc::new(boxcar::Vec::new()),
        }
    }

    /// Access the base type of this type, if it exists
    pub fn base(&self) -> Option<TypeRc> {
        self.base.get().and_then(TypeRef::upgrade)
    }

    /// Set the base type. A base can only be set once.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the base was already set.
    pub fn set_base(&self, base: &TypeRc) -> Result<()> {
        self.base
            .set(TypeRef::new(base))
            .map_err(|_| malformed_error!("Base of {} already set", self.fullname()))
    }

    /// The element type of an array type
    pub fn element_type(&self) -> Option<TypeRc> {
        self.element.get().and_then(TypeRef::upgrade)
    }

    pub(crate) fn set_element_type(&self, element: &TypeRc) -> Result<()> {
        self.element
            .set(TypeRef::new(element))
            .map_err(|_| malformed_error!("Element of {} already set", self.fullname()))
    }

    /// Returns the full name (Namespace.Name) of the entity
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Is this the root type `System.Object`
    pub fn is_root(&self) -> bool {
        self.flavor == TypeFlavor::Object
    }

    /// Is this an interface
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// Is this a constructed array type
    pub fn is_array(&self) -> bool {
        self.flavor == TypeFlavor::Array
    }

    /// Is this the primitive boolean
    pub fn is_boolean(&self) -> bool {
        self.flavor == TypeFlavor::Boolean
    }

    /// Is this the primitive void
    pub fn is_void(&self) -> bool {
        self.flavor == TypeFlavor::Void
    }

    /// This type followed by each of its superclasses, most-derived first, excluding the root.
    ///
    /// ## Arguments
    /// * `max_depth` - Maximum number of types to visit
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the chain is longer than `max_depth`, which
    /// also guards against cyclic base relations.
    pub fn class_chain(self: &Arc<Self>, max_depth: usize) -> Result<Vec<TypeRc>> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if ty.is_root() {
                break;
            }
            if chain.len() >= max_depth {
                return Err(RecursionLimit(max_depth));
            }
            current = ty.base();
            chain.push(ty);
        }
        Ok(chain)
    }

    /// The interfaces this type implements directly, followed by everything they extend.
    ///
    /// Each interface appears once, in breadth-first order.
    pub fn all_interfaces(&self) -> Vec<TypeRc> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut queue: Vec<TypeRc> = self
            .interfaces
            .iter()
            .filter_map(|(_, iface)| iface.upgrade())
            .collect();

        let mut next = 0;
        while next < queue.len() {
            let iface = queue[next].clone();
            next += 1;
            if !seen.insert(iface.token) {
                continue;
            }
            for (_, parent) in iface.interfaces.iter() {
                if let Some(parent) = parent.upgrade() {
                    queue.push(parent);
                }
            }
            result.push(iface);
        }
        result
    }

    /// Determines if a value of type `other` can be used where `self` is expected, i.e. `self`
    /// is the same type as, or a supertype of, `other`.
    ///
    /// - value primitives are only assignable from themselves
    /// - `System.Object` is assignable from every reference type
    /// - arrays are covariant in their element type
    /// - otherwise `self` must appear in `other`'s base chain or interface closure
    pub fn is_assignable_from(&self, other: &RuntimeType) -> bool {
        if self.token == other.token {
            return true;
        }
        if self.flavor.is_value_type() || other.flavor.is_value_type() {
            return false;
        }
        if self.is_root() {
            return true;
        }
        if self.is_array() || other.is_array() {
            return match (self.element_type(), other.element_type()) {
                (Some(mine), Some(theirs)) if self.is_array() && other.is_array() => {
                    mine.is_assignable_from(&theirs)
                }
                _ => false,
            };
        }

        let mut visited = HashSet::new();
        let mut pending: Vec<TypeRc> = Vec::new();
        if let Some(base) = other.base() {
            pending.push(base);
        }
        pending.extend(other.interfaces.iter().filter_map(|(_, i)| i.upgrade()));

        while let Some(candidate) = pending.pop() {
            if candidate.token == self.token {
                return true;
            }
            if !visited.insert(candidate.token) {
                continue;
            }
            if let Some(base) = candidate.base() {
                pending.push(base);
            }
            pending.extend(candidate.interfaces.iter().filter_map(|(_, i)| i.upgrade()));
        }
        false
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeType")
            .field("token", &self.token)
            .field("flavor", &self.flavor)
            .field("fullname", &self.fullname())
            .finish()
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(TypeRegistry::new().unwrap())
    }

    #[test]
    fn test_class_chain_stops_at_root() {
        let registry = registry();
        let animal = TypeBuilder::class(registry.clone(), "zoo", "Animal")
            .build()
            .unwrap();
        let dog = TypeBuilder::class(registry.clone(), "zoo", "Dog")
            .extends(&animal)
            .build()
            .unwrap();

        let chain = dog.class_chain(MAX_HIERARCHY_DEPTH).unwrap();
        let names: Vec<String> = chain.iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Dog", "Animal"]);
        assert!(registry.object().unwrap().class_chain(8).unwrap().is_empty());
    }

    #[test]
    fn test_class_chain_depth_limit() {
        let registry = registry();
        let a = TypeBuilder::class(registry.clone(), "", "A").build().unwrap();
        let b = TypeBuilder::class(registry.clone(), "", "B")
            .extends(&a)
            .build()
            .unwrap();
        assert!(matches!(b.class_chain(1), Err(RecursionLimit(1))));
        assert_eq!(b.class_chain(2).unwrap().len(), 2);
    }

    #[test]
    fn test_assignability() {
        let registry = registry();
        let named = TypeBuilder::interface(registry.clone(), "zoo", "Named")
            .build()
            .unwrap();
        let pet = TypeBuilder::interface(registry.clone(), "zoo", "Pet")
            .implements(&named)
            .build()
            .unwrap();
        let animal = TypeBuilder::class(registry.clone(), "zoo", "Animal")
            .build()
            .unwrap();
        let dog = TypeBuilder::class(registry.clone(), "zoo", "Dog")
            .extends(&animal)
            .implements(&pet)
            .build()
            .unwrap();
        let object = registry.object().unwrap();
        let string = registry.string().unwrap();
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();

        assert!(animal.is_assignable_from(&dog));
        assert!(!dog.is_assignable_from(&animal));
        assert!(pet.is_assignable_from(&dog));
        assert!(named.is_assignable_from(&dog));
        assert!(object.is_assignable_from(&dog));
        assert!(object.is_assignable_from(&pet));
        assert!(object.is_assignable_from(&string));
        assert!(!object.is_assignable_from(&int));
        assert!(int.is_assignable_from(&int));
        assert!(!string.is_assignable_from(&animal));
        assert!(!animal.is_assignable_from(&string));
    }

    #[test]
    fn test_array_assignability() {
        let registry = registry();
        let animal = TypeBuilder::class(registry.clone(), "zoo", "Animal")
            .build()
            .unwrap();
        let dog = TypeBuilder::class(registry.clone(), "zoo", "Dog")
            .extends(&animal)
            .build()
            .unwrap();
        let animals = registry.array_of(&animal).unwrap();
        let dogs = registry.array_of(&dog).unwrap();
        let ints = registry
            .array_of(&registry.get_primitive(PrimitiveKind::I4).unwrap())
            .unwrap();
        let longs = registry
            .array_of(&registry.get_primitive(PrimitiveKind::I8).unwrap())
            .unwrap();

        assert!(animals.is_assignable_from(&dogs));
        assert!(!dogs.is_assignable_from(&animals));
        assert!(!ints.is_assignable_from(&longs));
        assert!(registry.object().unwrap().is_assignable_from(&ints));
        assert!(!animal.is_assignable_from(&animals));
    }

    #[test]
    fn test_all_interfaces_closure() {
        let registry = registry();
        let a = TypeBuilder::interface(registry.clone(), "", "A").build().unwrap();
        let b = TypeBuilder::interface(registry.clone(), "", "B")
            .implements(&a)
            .build()
            .unwrap();
        let c = TypeBuilder::interface(registry.clone(), "", "C")
            .implements(&a)
            .build()
            .unwrap();
        let impl_type = TypeBuilder::class(registry.clone(), "", "Impl")
            .implements(&b)
            .implements(&c)
            .build()
            .unwrap();

        let names: Vec<String> = impl_type
            .all_interfaces()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }
}
