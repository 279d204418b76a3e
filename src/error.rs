use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// Which side of a property a lookup was performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PropertyAccess {
    /// Read side (getter or readable field)
    #[strum(to_string = "getter")]
    Read,
    /// Write side (setter or writable field)
    #[strum(to_string = "setter")]
    Write,
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Table Construction Errors
/// - [`Error::AmbiguousGetter`] - Two read accessors for one property cannot be ordered
/// - [`Error::AmbiguousSetter`] - Two write accessors for one property cannot be ordered
/// - [`Error::RecursionLimit`] - The ancestor chain of a type is deeper than allowed
///
/// ## Lookup Errors
/// - [`Error::UnknownProperty`] - No accessor for the requested property name
/// - [`Error::MissingDefaultConstructor`] - The type declares no zero-argument constructor
/// - [`Error::NoSuchConstructor`] - The type declares no constructor with the given parameters
/// - [`Error::TypeNotFound`] - Requested type not found in the registry
///
/// ## Invocation Errors
/// - [`Error::AccessDenied`] - Member access refused, even after privilege escalation
/// - [`Error::ArgumentCount`] - Wrong number of arguments passed to a member
/// - [`Error::TargetMismatch`] - Target object is not an instance of the declaring type
/// - [`Error::AbstractMember`] - Member has no implementation
/// - [`Error::Instantiation`] - Object construction failed
///
/// # Examples
///
/// ```rust
/// use propscope::{Error, metadata::typesystem::TypeRegistry, reflection::ReflectorFactory};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let factory = ReflectorFactory::new(registry.clone());
/// let string_type = registry.string()?;
///
/// match factory.find_for_type(&string_type)?.get_invoker("missing") {
///     Err(Error::UnknownProperty { property, .. }) => assert_eq!(property, "missing"),
///     _ => unreachable!(),
/// }
/// # Ok::<(), propscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The host type model is inconsistent.
    ///
    /// Includes the source location where the inconsistency was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Two getters resolve to the same property and neither return type is more specific.
    ///
    /// Fatal for the reflector of `declaring_type`; nothing gets cached.
    #[error("Illegal overloaded getter method with ambiguous type for property '{property}' in type '{declaring_type}'")]
    AmbiguousGetter {
        /// Canonical name of the contested property
        property: String,
        /// Full name of the type declaring the current winner
        declaring_type: String,
    },

    /// Two setters resolve to the same property and their parameter types are unrelated.
    #[error("Ambiguous setters defined for property '{property}' in type '{declaring_type}' with types '{first}' and '{second}'")]
    AmbiguousSetter {
        /// Canonical name of the contested property
        property: String,
        /// Full name of the type declaring the later candidate
        declaring_type: String,
        /// Parameter type of the earlier candidate
        first: String,
        /// Parameter type of the later candidate
        second: String,
    },

    /// The type declares no zero-argument constructor.
    #[error("There is no default constructor for '{0}'")]
    MissingDefaultConstructor(String),

    /// The type declares no constructor with the requested parameter types.
    #[error("'{type_name}' declares no constructor taking ({arg_types})")]
    NoSuchConstructor {
        /// Full name of the type
        type_name: String,
        /// Comma separated requested parameter types
        arg_types: String,
    },

    /// No accessor is known for the requested property.
    #[error("There is no {kind} for property named '{property}' in '{type_name}'")]
    UnknownProperty {
        /// Whether a read or a write accessor was requested
        kind: PropertyAccess,
        /// The requested property name
        property: String,
        /// Full name of the queried type
        type_name: String,
    },

    /// The member refused access and escalation was unavailable or did not help.
    #[error("Access to '{member}' in '{type_name}' denied")]
    AccessDenied {
        /// Name of the refusing member
        member: String,
        /// Full name of the declaring type
        type_name: String,
    },

    /// A method name does not follow the `is`/`get`/`set` convention.
    #[error("Error parsing property name '{0}'. Didn't start with 'is', 'get' or 'set'")]
    InvalidPropertyName(String),

    /// A member was invoked with the wrong number of arguments.
    #[error("'{member}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Name of the invoked member
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Number of supplied arguments
        actual: usize,
    },

    /// The target object is not an instance of the member's declaring type.
    #[error("'{member}' is declared on '{expected}' but the target is a '{actual}'")]
    TargetMismatch {
        /// Name of the invoked member
        member: String,
        /// Full name of the declaring type
        expected: String,
        /// Full name of the target's runtime type
        actual: String,
    },

    /// The member is declared without an implementation.
    #[error("'{0}' has no implementation")]
    AbstractMember(String),

    /// Constructing an instance failed.
    #[error("Error instantiating '{type_name}' with invalid types ({arg_types}) or values ({arg_values}). Cause: {cause}")]
    Instantiation {
        /// Full name of the type that was instantiated
        type_name: String,
        /// Comma separated constructor parameter types
        arg_types: String,
        /// Comma separated argument values
        arg_values: String,
        /// The underlying failure
        cause: Box<Error>,
    },

    /// Failed to find a type in the `TypeRegistry`.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// Recursion limit reached.
    ///
    /// Walking the ancestor chain of a type exceeded the configured maximum depth, which
    /// usually means the base relation is cyclic.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}
