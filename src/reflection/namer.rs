//! Property name normalization.
//!
//! Accessor methods follow the `is<Name>` / `get<Name>` / `set<Name>` convention. The
//! canonical property name is the remainder after the prefix with its first character
//! lower-cased, unless the second character is upper-case (`getURL` → `URL`).

use strum::{Display, EnumIter};

use crate::{Error::InvalidPropertyName, Result};

/// Role of an accessor method, derived from its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum AccessorRole {
    /// `is<Name>`, boolean read accessor
    #[strum(to_string = "is")]
    Is,
    /// `get<Name>`, read accessor
    #[strum(to_string = "get")]
    Get,
    /// `set<Name>`, write accessor
    #[strum(to_string = "set")]
    Set,
}

impl AccessorRole {
    /// Classify a member name by its prefix. Names consisting of the bare prefix are not
    /// accessors.
    ///
    /// ## Arguments
    /// * 'name' - Member name
    pub fn classify(name: &str) -> Option<AccessorRole> {
        if name.len() > 3 {
            if name.starts_with("get") {
                return Some(AccessorRole::Get);
            }
            if name.starts_with("set") {
                return Some(AccessorRole::Set);
            }
        }
        if name.len() > 2 && name.starts_with("is") {
            return Some(AccessorRole::Is);
        }
        None
    }

    /// Is this a read accessor role
    pub fn is_read(self) -> bool {
        matches!(self, AccessorRole::Is | AccessorRole::Get)
    }
}

/// Convert an accessor method name into its canonical property name.
///
/// ## Arguments
/// * 'name' - Method name starting with `is`, `get` or `set`
///
/// # Errors
/// Returns [`crate::Error::InvalidPropertyName`] if the name has none of the prefixes.
///
/// # Examples
///
/// ```rust
/// use propscope::reflection::namer::method_to_property;
///
/// assert_eq!(method_to_property("getName")?, "name");
/// assert_eq!(method_to_property("getURL")?, "URL");
/// assert_eq!(method_to_property("isActive")?, "active");
/// assert_eq!(method_to_property("setX")?, "x");
/// # Ok::<(), propscope::Error>(())
/// ```
pub fn method_to_property(name: &str) -> Result<String> {
    let stripped = if let Some(rest) = name.strip_prefix("is") {
        rest
    } else if let Some(rest) = name.strip_prefix("get").or_else(|| name.strip_prefix("set")) {
        rest
    } else {
        return Err(InvalidPropertyName(name.to_string()));
    };

    let mut chars = stripped.chars();
    let Some(first) = chars.next() else {
        return Ok(String::new());
    };
    let second_is_upper = chars.clone().next().is_some_and(char::is_uppercase);
    if second_is_upper {
        return Ok(stripped.to_string());
    }

    Ok(first.to_lowercase().chain(chars).collect())
}

/// Does `name` follow any of the accessor conventions
pub fn is_property(name: &str) -> bool {
    AccessorRole::classify(name).is_some()
}

/// Does `name` follow the `get<Name>` or `is<Name>` convention
pub fn is_getter(name: &str) -> bool {
    AccessorRole::classify(name).is_some_and(AccessorRole::is_read)
}

/// Does `name` follow the `set<Name>` convention
pub fn is_setter(name: &str) -> bool {
    AccessorRole::classify(name) == Some(AccessorRole::Set)
}

/// Whether `name` may be exposed as a property: not starting with `$`, and neither
/// `serialVersionUID` nor `class`.
pub fn is_valid_property_name(name: &str) -> bool {
    !(name.starts_with('$') || name == "serialVersionUID" || name == "class")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_property() {
        assert_eq!(method_to_property("getName").unwrap(), "name");
        assert_eq!(method_to_property("getURL").unwrap(), "URL");
        assert_eq!(method_to_property("isActive").unwrap(), "active");
        assert_eq!(method_to_property("setUserName").unwrap(), "userName");
        assert_eq!(method_to_property("getA").unwrap(), "a");
        assert_eq!(method_to_property("getXValue").unwrap(), "XValue");
        assert_eq!(method_to_property("getÄrger").unwrap(), "ärger");
        assert_eq!(method_to_property("get").unwrap(), "");
    }

    #[test]
    fn test_method_to_property_invalid() {
        assert!(matches!(
            method_to_property("name"),
            Err(InvalidPropertyName(n)) if n == "name"
        ));
        assert!(method_to_property("toString").is_err());
    }

    #[test]
    fn test_classification() {
        assert_eq!(AccessorRole::classify("getX"), Some(AccessorRole::Get));
        assert_eq!(AccessorRole::classify("isX"), Some(AccessorRole::Is));
        assert_eq!(AccessorRole::classify("setX"), Some(AccessorRole::Set));
        assert_eq!(AccessorRole::classify("get"), None);
        assert_eq!(AccessorRole::classify("is"), None);
        assert_eq!(AccessorRole::classify("reset"), None);

        assert!(is_getter("isOpen"));
        assert!(is_getter("getOpen"));
        assert!(!is_getter("setOpen"));
        assert!(is_setter("setOpen"));
        assert!(!is_setter("set"));
        assert!(is_property("getX"));
        assert!(!is_property("run"));
        assert_eq!(AccessorRole::Is.to_string(), "is");
    }

    #[test]
    fn test_valid_property_names() {
        assert!(is_valid_property_name("name"));
        assert!(!is_valid_property_name("$jacocoData"));
        assert!(!is_valid_property_name("serialVersionUID"));
        assert!(!is_valid_property_name("class"));
    }
}
