//! Declared (possibly generic) value types of members.
//!
//! Fields, method returns and method parameters are declared with a [`GenericType`]. Accessor
//! resolution only ever compares *erased* types, obtained through [`GenericType::erasure`].

use std::fmt;

use crate::{
    metadata::typesystem::{TypeRc, TypeRef, TypeRegistry},
    Result,
};

/// The declared type of a member, as written in its signature.
#[derive(Clone, Debug)]
pub enum GenericType {
    /// A plain, non-parameterized type (including plain array types)
    Raw(TypeRef),
    /// A generic type with concrete or variable arguments, e.g. `List<String>`
    Parameterized {
        /// The generic type definition, e.g. `List`
        raw: TypeRef,
        /// The type arguments in declaration order
        arguments: Vec<GenericType>,
    },
    /// An array whose component is itself generic, e.g. `List<String>[]` or `T[]`
    GenericArray(Box<GenericType>),
    /// A type variable such as `T`
    Variable(String),
    /// An unbounded wildcard `?`
    Wildcard,
}

impl GenericType {
    /// A plain type
    #[must_use]
    pub fn raw(ty: &TypeRc) -> Self {
        GenericType::Raw(TypeRef::new(ty))
    }

    /// A generic instantiation of `raw` with `arguments`
    #[must_use]
    pub fn parameterized(raw: &TypeRc, arguments: Vec<GenericType>) -> Self {
        GenericType::Parameterized {
            raw: TypeRef::new(raw),
            arguments,
        }
    }

    /// An array of a generic component
    #[must_use]
    pub fn array_of(component: GenericType) -> Self {
        GenericType::GenericArray(Box::new(component))
    }

    /// A type variable
    #[must_use]
    pub fn variable(name: &str) -> Self {
        GenericType::Variable(name.to_string())
    }

    /// The plain type, if this is [`GenericType::Raw`] and the type is still alive
    #[must_use]
    pub fn raw_type(&self) -> Option<TypeRc> {
        match self {
            GenericType::Raw(ty) => ty.upgrade(),
            _ => None,
        }
    }

    /// Normalize to the erased (raw, non-parameterized) runtime type.
    ///
    /// - a raw type erases to itself
    /// - a parameterized type erases to its raw form
    /// - a generic array erases to an array of the erased component
    /// - type variables and wildcards erase to `System.Object`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a referenced type has been dropped, or an error
    /// from the registry when the array type or `System.Object` cannot be produced.
    pub fn erasure(&self, registry: &TypeRegistry) -> Result<TypeRc> {
        match self {
            GenericType::Raw(ty) | GenericType::Parameterized { raw: ty, .. } => ty
                .upgrade()
                .ok_or_else(|| malformed_error!("Declared type has been dropped")),
            GenericType::GenericArray(component) => {
                let element = component.erasure(registry)?;
                registry.array_of(&element)
            }
            GenericType::Variable(_) | GenericType::Wildcard => registry.object(),
        }
    }
}

impl From<&TypeRc> for GenericType {
    fn from(ty: &TypeRc) -> Self {
        GenericType::raw(ty)
    }
}

impl From<TypeRc> for GenericType {
    fn from(ty: TypeRc) -> Self {
        GenericType::raw(&ty)
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericType::Raw(ty) => {
                write!(f, "{}", ty.fullname().unwrap_or_else(|| "<dropped>".into()))
            }
            GenericType::Parameterized { raw, arguments } => {
                write!(f, "{}<", raw.fullname().unwrap_or_else(|| "<dropped>".into()))?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ">")
            }
            GenericType::GenericArray(component) => write!(f, "{component}[]"),
            GenericType::Variable(name) => write!(f, "{name}"),
            GenericType::Wildcard => write!(f, "?"),
        }
    }
}
