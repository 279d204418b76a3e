//! Builder for class and interface definitions.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API for defining
//! runtime types together with their fields, methods and constructors, and for registering
//! them in the [`TypeRegistry`].
//!
//! The type under construction exists from the start (see [`TypeBuilder::current`]), so
//! members may refer to the type that declares them.
//!
//! # Example
//!
//! ```rust
//! use propscope::metadata::member::MemberFlags;
//! use propscope::metadata::typesystem::{PrimitiveKind, TypeBuilder, TypeRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let int_type = registry.get_primitive(PrimitiveKind::I4)?;
//! let account = TypeBuilder::class(registry.clone(), "bank", "Account")
//!     .property("owner", &registry.string()?)
//!     .field("balance", &int_type, MemberFlags::PRIVATE)
//!     .default_constructor()
//!     .build()?;
//!
//! assert_eq!(account.methods.count(), 2);
//! assert_eq!(account.fields.count(), 2);
//! # Ok::<(), propscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        member::{
            Constructor, ConstructorBody, Field, MemberFlags, Method, MethodBody,
        },
        token::Token,
        typesystem::{GenericType, PrimitiveKind, RuntimeType, TypeFlavor, TypeRc, TypeRef, TypeRegistry},
        value::Value,
    },
    Error, Result,
};

/// Provides a fluent API for defining a class or interface
pub struct TypeBuilder {
    /// Type registry the type is registered in
    registry: Arc<TypeRegistry>,
    /// Type being built
    current: TypeRc,
    /// Explicit base type, `System.Object` for classes if unset
    base: Option<TypeRc>,
    /// First failure encountered while adding members, reported by `build`
    error: Option<Error>,
}

impl TypeBuilder {
    /// Start building a class with the given name
    ///
    /// ## Arguments
    /// * 'registry'  - The type registry to use
    /// * 'namespace' - Namespace for a class type
    /// * 'name'      - Name for a class type
    pub fn class(registry: Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        Self::start(registry, TypeFlavor::Class, namespace, name)
    }

    /// Start building an interface with the given name
    ///
    /// ## Arguments
    /// * 'registry'  - The type registry to use
    /// * 'namespace' - Namespace for an interface type
    /// * 'name'      - Name for an interface type
    pub fn interface(registry: Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        Self::start(registry, TypeFlavor::Interface, namespace, name)
    }

    fn start(registry: Arc<TypeRegistry>, flavor: TypeFlavor, namespace: &str, name: &str) -> Self {
        // row 0 is never allocated, and a builder holding an error never registers its type
        let (token, error) = match registry.next_token(Token::TYPE_TABLE) {
            Ok(token) => (token, None),
            Err(error) => (Token::from_parts(Token::TYPE_TABLE, 0), Some(error)),
        };
        let current = Arc::new(RuntimeType::new(
            token,
            flavor,
            namespace.to_string(),
            name.to_string(),
        ));

        TypeBuilder {
            registry,
            current,
            base: None,
            error,
        }
    }

    /// Allocate a member token, recording the failure for `build`
    fn allocate(&mut self, table: u8) -> Option<Token> {
        match self.registry.next_token(table) {
            Ok(token) => Some(token),
            Err(error) => {
                self.error.get_or_insert(error);
                None
            }
        }
    }

    /// The type under construction, usable as a member type of itself
    pub fn current(&self) -> TypeRc {
        self.current.clone()
    }

    /// Set the base type of a class
    ///
    /// ## Arguments
    /// * 'base' - The superclass
    #[must_use]
    pub fn extends(mut self, base: &TypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add an implemented (or, for interfaces, extended) interface
    ///
    /// ## Arguments
    /// * 'interface' - The interface type
    #[must_use]
    pub fn implements(self, interface: &TypeRc) -> Self {
        self.current.interfaces.push(TypeRef::new(interface));
        self
    }

    /// Declare a field of a plain type
    ///
    /// ## Arguments
    /// * 'name'  - Field name
    /// * 'ty'    - Declared type
    /// * 'flags' - Attribute flags
    #[must_use]
    pub fn field(self, name: &str, ty: &TypeRc, flags: MemberFlags) -> Self {
        self.generic_field(name, GenericType::raw(ty), flags)
    }

    /// Declare a field with a generic declared type
    ///
    /// ## Arguments
    /// * 'name'       - Field name
    /// * 'field_type' - Declared type
    /// * 'flags'      - Attribute flags
    #[must_use]
    pub fn generic_field(mut self, name: &str, field_type: GenericType, flags: MemberFlags) -> Self {
        self.push_field(name, field_type, flags);
        self
    }

    fn push_field(
        &mut self,
        name: &str,
        field_type: GenericType,
        flags: MemberFlags,
    ) -> Option<Arc<Field>> {
        let token = self.allocate(Token::FIELD_TABLE)?;
        let field = Arc::new(Field::new(token, name, field_type, flags, &self.current));
        self.current.fields.push(field.clone());
        Some(field)
    }

    /// Declare a method
    ///
    /// ## Arguments
    /// * 'name'    - Method name
    /// * 'flags'   - Attribute flags
    /// * 'returns' - Declared return type
    /// * 'params'  - Declared parameter types
    /// * 'body'    - Implementation, `None` for abstract methods
    #[must_use]
    pub fn method(
        mut self,
        name: &str,
        flags: MemberFlags,
        returns: impl Into<GenericType>,
        params: Vec<GenericType>,
        body: Option<MethodBody>,
    ) -> Self {
        let Some(token) = self.allocate(Token::METHOD_TABLE) else {
            return self;
        };
        let method = Method::new(
            token,
            name,
            flags,
            returns.into(),
            params,
            body,
            &self.current,
        );
        self.current.methods.push(Arc::new(method));
        self
    }

    /// Declare a public method without implementation
    ///
    /// ## Arguments
    /// * 'name'    - Method name
    /// * 'returns' - Declared return type
    /// * 'params'  - Declared parameter types
    #[must_use]
    pub fn abstract_method(
        self,
        name: &str,
        returns: impl Into<GenericType>,
        params: Vec<GenericType>,
    ) -> Self {
        self.method(
            name,
            MemberFlags::PUBLIC | MemberFlags::ABSTRACT,
            returns,
            params,
            None,
        )
    }

    /// Declare a constructor
    ///
    /// ## Arguments
    /// * 'flags'  - Attribute flags
    /// * 'params' - Declared parameter types
    /// * 'body'   - Initializer run on the freshly allocated instance
    #[must_use]
    pub fn constructor(
        mut self,
        flags: MemberFlags,
        params: Vec<GenericType>,
        body: Option<ConstructorBody>,
    ) -> Self {
        let Some(token) = self.allocate(Token::CONSTRUCTOR_TABLE) else {
            return self;
        };
        let constructor = Constructor::new(
            token,
            flags,
            params,
            body,
            &self.current,
        );
        self.current.constructors.push(Arc::new(constructor));
        self
    }

    /// Declare a public zero-argument constructor without initializer
    #[must_use]
    pub fn default_constructor(self) -> Self {
        self.constructor(MemberFlags::PUBLIC, Vec::new(), None)
    }

    /// Declare a bean property: a private backing field `name`, a public getter (`is<Name>` for
    /// primitive booleans, `get<Name>` otherwise) and a public `set<Name>`.
    ///
    /// ## Arguments
    /// * 'name' - Property name, used verbatim for the field
    /// * 'ty'   - Property type
    #[must_use]
    pub fn property(self, name: &str, ty: &TypeRc) -> Self {
        self.generic_property(name, GenericType::raw(ty))
    }

    /// Declare a bean property with a generic declared type, see [`TypeBuilder::property`]
    ///
    /// ## Arguments
    /// * 'name'          - Property name, used verbatim for the field
    /// * 'property_type' - Declared property type
    #[must_use]
    pub fn generic_property(mut self, name: &str, property_type: GenericType) -> Self {
        let void = match self.registry.get_primitive(PrimitiveKind::Void) {
            Ok(void) => void,
            Err(error) => {
                self.error.get_or_insert(error);
                return self;
            }
        };

        let Some(field) = self.push_field(name, property_type.clone(), MemberFlags::PRIVATE) else {
            return self;
        };
        let capitalized = capitalize(name);
        let getter_prefix = match property_type.raw_type() {
            Some(ty) if ty.is_boolean() => "is",
            _ => "get",
        };

        let getter_field = field.clone();
        let getter: MethodBody = Arc::new(move |target, _| target.load(&getter_field));
        let setter: MethodBody = Arc::new(move |target, args| {
            target.store(&field, args.first().cloned().unwrap_or_default())?;
            Ok(Value::Null)
        });

        self.method(
            &format!("{getter_prefix}{capitalized}"),
            MemberFlags::PUBLIC,
            property_type.clone(),
            Vec::new(),
            Some(getter),
        )
        .method(
            &format!("set{capitalized}"),
            MemberFlags::PUBLIC,
            &void,
            vec![property_type],
            Some(setter),
        )
    }

    /// Finish the type and register it.
    ///
    /// Classes without explicit base extend `System.Object`.
    ///
    /// # Errors
    /// Returns the first error recorded while adding members, or an error if `System.Object`
    /// is missing from the registry.
    pub fn build(self) -> Result<TypeRc> {
        if let Some(error) = self.error {
            return Err(error);
        }

        if self.current.flavor == TypeFlavor::Class {
            let base = match self.base {
                Some(base) => base,
                None => self.registry.object()?,
            };
            self.current.set_base(&base)?;
        } else if self.base.is_some() {
            return Err(malformed_error!(
                "Interface {} cannot extend a class",
                self.current.fullname()
            ));
        }

        self.registry.insert(&self.current);
        Ok(self.current)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
