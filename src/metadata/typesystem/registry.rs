//! Central type registry of the host type model.
//!
//! This module provides the `TypeRegistry`, a thread-safe registry owning every
//! [`RuntimeType`] known to the process. Types hold only weak references to each other (base,
//! interfaces, member types), so the registry is what keeps them alive.
//!
//! # Registry Architecture
//!
//! - **Token-based lookup**: Primary index using [`Token`]s, stored in a lock-free `SkipMap`
//! - **Name-based lookup**: Secondary index by full name (`DashMap`)
//! - **Array types**: Constructed on demand, deduplicated per element type (`DashMap`)
//!
//! # Thread Safety
//!
//! All operations take `&self` and may be called concurrently. Token allocation is a single
//! atomic counter.
//!
//! # Examples
//!
//! ```rust
//! use propscope::metadata::typesystem::{PrimitiveKind, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let int_type = registry.get_primitive(PrimitiveKind::I4)?;
//! assert_eq!(int_type.fullname(), "System.Int32");
//!
//! let ints = registry.array_of(&int_type)?;
//! assert_eq!(ints.fullname(), "System.Int32[]");
//! assert!(std::sync::Arc::ptr_eq(&ints, &registry.array_of(&int_type)?));
//! # Ok::<(), propscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use strum::IntoEnumIterator;

use crate::{
    metadata::{
        token::Token,
        typesystem::{PrimitiveKind, RuntimeType, TypeFlavor, TypeRc},
    },
    Error::TypeNotFound,
    Result,
};

/// Central registry for managing all runtime types.
///
/// `TypeRegistry` is created with every [`PrimitiveKind`] pre-registered; `System.String`
/// extends `System.Object`, the value primitives have no base type.
pub struct TypeRegistry {
    /// Primary type storage indexed by tokens
    types: SkipMap<Token, TypeRc>,
    /// Atomic counter for generating unique rows for new types and members
    next_row: AtomicU32,
    /// Secondary index: types indexed by full name (namespace.name)
    types_by_fullname: DashMap<String, Vec<Token>>,
    /// Constructed array types, keyed by their element type
    arrays: DashMap<Token, TypeRc>,
}

impl TypeRegistry {
    /// Create a new type registry with initialized primitive types.
    ///
    /// # Errors
    ///
    /// This function will return an error if the primitive type initialization fails,
    /// which could happen due to internal inconsistencies during registry setup.
    pub fn new() -> Result<Self> {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            next_row: AtomicU32::new(1),
            types_by_fullname: DashMap::new(),
            arrays: DashMap::new(),
        };

        registry.initialize_primitives()?;
        Ok(registry)
    }

    /// Initialize primitive types in the registry
    fn initialize_primitives(&self) -> Result<()> {
        for kind in PrimitiveKind::iter() {
            let new_type = Arc::new(RuntimeType::new(
                kind.token(),
                kind.to_flavor(),
                kind.namespace().to_string(),
                kind.name().to_string(),
            ));
            self.insert(&new_type);
        }

        let object = self.object()?;
        self.get_primitive(PrimitiveKind::String)?
            .set_base(&object)?;

        Ok(())
    }

    /// Allocate a fresh token in `table`.
    ///
    /// Rows are unique across all tables of this registry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] once all rows a token can carry have been handed out.
    pub fn next_token(&self, table: u8) -> Result<Token> {
        let row = self
            .next_row
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |row| {
                (row <= Token::MAX_ROW).then_some(row + 1)
            })
            .map_err(|_| malformed_error!("Token rows exhausted for table 0x{:02X}", table))?;

        Ok(Token::from_parts(table, row))
    }

    /// Register a type in all the lookup tables. The first type registered under a token wins;
    /// later registrations of that token are ignored.
    ///
    /// ## Arguments
    /// * `type_rc` - The type instance
    pub fn insert(&self, type_rc: &TypeRc) {
        let token = type_rc.token;
        let entry = self.types.get_or_insert(token, type_rc.clone());
        if !Arc::ptr_eq(entry.value(), type_rc) {
            return;
        }

        self.types_by_fullname
            .entry(type_rc.fullname())
            .or_default()
            .push(token);
    }

    /// Get a type by its token
    pub fn get(&self, token: &Token) -> Option<TypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Get a primitive type
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the primitive was not registered.
    pub fn get_primitive(&self, kind: PrimitiveKind) -> Result<TypeRc> {
        let token = kind.token();
        self.get(&token).ok_or(TypeNotFound(token))
    }

    /// The root type `System.Object`
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the registry was not initialized.
    pub fn object(&self) -> Result<TypeRc> {
        self.get_primitive(PrimitiveKind::Object)
    }

    /// The `System.String` type
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the registry was not initialized.
    pub fn string(&self) -> Result<TypeRc> {
        self.get_primitive(PrimitiveKind::String)
    }

    /// The primitive boolean type
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the registry was not initialized.
    pub fn boolean(&self) -> Result<TypeRc> {
        self.get_primitive(PrimitiveKind::Boolean)
    }

    /// Get the first type registered under a full name
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeRc> {
        let tokens = self.types_by_fullname.get(fullname)?;
        tokens.first().and_then(|token| self.get(token))
    }

    /// Get the array type with the given element type, constructing it on first use.
    ///
    /// Concurrent callers asking for the same element type receive the same array type.
    ///
    /// # Errors
    /// Returns an error if `System.Object` is missing or the new type could not be wired up.
    pub fn array_of(&self, element: &TypeRc) -> Result<TypeRc> {
        if let Some(existing) = self.arrays.get(&element.token) {
            return Ok(existing.value().clone());
        }

        let object = self.object()?;
        let array = Arc::new(RuntimeType::new(
            self.next_token(Token::ARRAY_TABLE)?,
            TypeFlavor::Array,
            element.namespace.clone(),
            format!("{}[]", element.name),
        ));
        array.set_base(&object)?;
        array.set_element_type(element)?;

        let stored = self
            .arrays
            .entry(element.token)
            .or_insert_with(|| array.clone())
            .value()
            .clone();
        if Arc::ptr_eq(&stored, &array) {
            self.insert(&stored);
        }
        Ok(stored)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all registered types in token order
    pub fn iter(&self) -> impl Iterator<Item = TypeRc> + '_ {
        self.types.iter().map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use strum::EnumCount;

    use super::*;

    #[test]
    fn test_registry_primitives() {
        let registry = TypeRegistry::new().unwrap();
        assert_eq!(registry.len(), PrimitiveKind::COUNT);

        let bool_type = registry.get_primitive(PrimitiveKind::Boolean).unwrap();
        assert_eq!(bool_type.name, "Boolean");
        assert_eq!(bool_type.namespace, "System");
        assert!(bool_type.base().is_none());

        let object = registry.object().unwrap();
        let string = registry.string().unwrap();
        assert!(object.is_root());
        assert_eq!(string.base().unwrap().token, object.token);
    }

    #[test]
    fn test_lookup_by_fullname() {
        let registry = TypeRegistry::new().unwrap();
        let found = registry.get_by_fullname("System.Int64").unwrap();
        assert_eq!(found.flavor, TypeFlavor::I8);
        assert!(registry.get_by_fullname("System.Missing").is_none());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let registry = TypeRegistry::new().unwrap();
        let ty = Arc::new(RuntimeType::new(
            registry.next_token(Token::TYPE_TABLE).unwrap(),
            TypeFlavor::Class,
            "demo".to_string(),
            "Widget".to_string(),
        ));
        registry.insert(&ty);
        registry.insert(&ty);

        assert_eq!(registry.len(), PrimitiveKind::COUNT + 1);
        assert_eq!(registry.get(&ty.token).unwrap().name, "Widget");
    }

    #[test]
    fn test_next_token_unique() {
        let registry = TypeRegistry::new().unwrap();
        let first = registry.next_token(Token::TYPE_TABLE).unwrap();
        let second = registry.next_token(Token::FIELD_TABLE).unwrap();
        assert_ne!(first.row(), second.row());
        assert_eq!(second.table(), Token::FIELD_TABLE);
    }

    #[test]
    fn test_exhausted_rows_never_alias() {
        use crate::{
            metadata::{member::MemberFlags, typesystem::TypeBuilder},
            reflection::ReflectorFactory,
            Error,
        };

        let registry = Arc::new(TypeRegistry::new().unwrap());
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        registry.next_row.store(Token::MAX_ROW, Ordering::Relaxed);

        let first = TypeBuilder::class(registry.clone(), "d", "First").build().unwrap();
        assert_eq!(first.token.row(), Token::MAX_ROW);

        assert!(matches!(
            registry.next_token(Token::TYPE_TABLE),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            TypeBuilder::class(registry.clone(), "d", "Second").build(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            TypeBuilder::class(registry.clone(), "d", "Third")
                .field("count", &int, MemberFlags::PRIVATE)
                .build(),
            Err(Error::Malformed { .. })
        ));
        assert!(registry.array_of(&int).is_err());
        assert!(registry.get_by_fullname("d.Second").is_none());

        let factory = ReflectorFactory::new(registry.clone());
        let reflector = factory.find_for_type(&first).unwrap();
        assert_eq!(reflector.runtime_type().fullname(), "d.First");
    }

    #[test]
    fn test_array_of_concurrent() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let string = registry.string().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let string = string.clone();
                thread::spawn(move || registry.array_of(&string).unwrap())
            })
            .collect();

        let arrays: Vec<TypeRc> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for array in &arrays {
            assert!(Arc::ptr_eq(array, &arrays[0]));
        }
        assert_eq!(arrays[0].element_type().unwrap().token, string.token);
        assert_eq!(arrays[0].base().unwrap().token, registry.object().unwrap().token);
    }
}
