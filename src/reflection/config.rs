//! Reflector configuration
//!
//! This module provides the settings a [`crate::reflection::ReflectorFactory`] is created
//! with: the initial state of the class cache, whether the default privilege-escalation
//! policy allows bypassing member access checks, and the bound on ancestor walks.

use crate::metadata::typesystem::MAX_HIERARCHY_DEPTH;

/// Configuration for reflector construction and caching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectorConfig {
    /// Memoize one reflector per type (can be toggled later on the factory)
    pub class_cache_enabled: bool,

    /// Answer of the default access policy: whether accessors may suppress access checks
    /// and retry after a member refused access
    pub suppress_access_checks: bool,

    /// Maximum number of types visited when walking the ancestor chain of a type (default: 64)
    pub max_hierarchy_depth: usize,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            class_cache_enabled: true,
            suppress_access_checks: true,
            max_hierarchy_depth: MAX_HIERARCHY_DEPTH,
        }
    }
}

impl ReflectorConfig {
    /// Creates a configuration that never memoizes reflectors
    ///
    /// Every lookup rebuilds the accessor table; useful when types are redefined at runtime.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            class_cache_enabled: false,
            ..Self::default()
        }
    }

    /// Creates a configuration that never escalates privileges
    ///
    /// Non-public members stay unreachable: access failures propagate unchanged.
    #[must_use]
    pub fn restricted() -> Self {
        Self {
            suppress_access_checks: false,
            ..Self::default()
        }
    }
}
