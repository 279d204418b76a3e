//! Memoizing reflector factory.
//!
//! [`ReflectorFactory`] hands out one [`Reflector`] per runtime type. Reflectors are keyed by
//! type token in a sharded `DashMap`; construction happens outside of any map lock, so racing
//! first requests may build redundant reflectors, but only the first stored one is ever
//! returned.
//!
//! # Thread Safety
//!
//! All methods take `&self`. The class cache can be switched off and on at any time; switching
//! it off does not evict existing entries, it only bypasses them.
//!
//! # Examples
//!
//! ```rust
//! use propscope::{metadata::typesystem::{TypeBuilder, TypeRegistry}, reflection::ReflectorFactory};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let user = TypeBuilder::class(registry.clone(), "demo", "User")
//!     .property("userName", &registry.string()?)
//!     .build()?;
//!
//! let factory = ReflectorFactory::new(registry);
//! let reflector = factory.find_for_type(&user)?;
//! assert!(Arc::ptr_eq(&reflector, &factory.find_for_type(&user)?));
//! assert_eq!(reflector.find_property_name("username"), Some("userName"));
//! # Ok::<(), propscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::trace;

use crate::{
    metadata::{
        token::Token,
        typesystem::{TypeRc, TypeRegistry},
    },
    reflection::{
        access::{AccessPolicy, StaticAccess},
        config::ReflectorConfig,
        reflector::Reflector,
    },
    Result,
};

/// Produces and caches [`Reflector`]s.
pub struct ReflectorFactory {
    /// Registry used to erase member types
    registry: Arc<TypeRegistry>,
    /// Settings the factory was created with
    config: ReflectorConfig,
    /// Escalation policy handed to every accessor
    policy: Arc<dyn AccessPolicy>,
    /// Whether reflectors are memoized
    class_cache_enabled: AtomicBool,
    /// Memoized reflectors, keyed by type token
    reflectors: DashMap<Token, Arc<Reflector>>,
}

impl ReflectorFactory {
    /// Create a factory with the default configuration
    ///
    /// ## Arguments
    /// * 'registry' - The registry owning the reflected types
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, ReflectorConfig::default())
    }

    /// Create a factory with an explicit configuration
    ///
    /// ## Arguments
    /// * 'registry' - The registry owning the reflected types
    /// * 'config'   - Cache, escalation and depth settings
    pub fn with_config(registry: Arc<TypeRegistry>, config: ReflectorConfig) -> Self {
        ReflectorFactory {
            registry,
            config,
            policy: Arc::new(StaticAccess(config.suppress_access_checks)),
            class_cache_enabled: AtomicBool::new(config.class_cache_enabled),
            reflectors: DashMap::new(),
        }
    }

    /// Replace the escalation policy derived from the configuration.
    ///
    /// Only reflectors built afterwards use the new policy.
    ///
    /// ## Arguments
    /// * 'policy' - The policy consulted after an access refusal
    #[must_use]
    pub fn with_access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// The registry owning the reflected types
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The configuration this factory was created with
    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }

    /// The escalation policy handed to accessors
    pub fn access_policy(&self) -> &Arc<dyn AccessPolicy> {
        &self.policy
    }

    /// Whether reflectors are currently memoized
    pub fn is_class_cache_enabled(&self) -> bool {
        self.class_cache_enabled.load(Ordering::Acquire)
    }

    /// Switch memoization on or off. Existing entries are kept.
    ///
    /// ## Arguments
    /// * 'enabled' - The new state
    pub fn set_class_cache_enabled(&self, enabled: bool) {
        self.class_cache_enabled.store(enabled, Ordering::Release);
    }

    /// The reflector of `ty`.
    ///
    /// With the class cache enabled, every call for the same type returns the same `Arc`,
    /// across threads. With the cache disabled, a fresh reflector is built and not stored.
    ///
    /// ## Arguments
    /// * 'ty' - The type to reflect
    ///
    /// # Errors
    /// Returns the construction failure, see [`Reflector::new`]. Failures are never cached.
    pub fn find_for_type(&self, ty: &TypeRc) -> Result<Arc<Reflector>> {
        if !self.is_class_cache_enabled() {
            return self.build(ty).map(Arc::new);
        }

        if let Some(cached) = self.reflectors.get(&ty.token) {
            trace!(type_name = %ty.fullname(), "reflector cache hit");
            return Ok(cached.value().clone());
        }

        trace!(type_name = %ty.fullname(), "reflector cache miss");
        let built = Arc::new(self.build(ty)?);
        let stored = self
            .reflectors
            .entry(ty.token)
            .or_insert(built)
            .value()
            .clone();
        Ok(stored)
    }

    /// Build the reflectors of `types` in parallel, populating the cache.
    ///
    /// ## Arguments
    /// * 'types' - The types to warm up
    ///
    /// # Errors
    /// Returns a construction failure if any of the types cannot be reflected.
    pub fn preload(&self, types: &[TypeRc]) -> Result<()> {
        types
            .par_iter()
            .try_for_each(|ty| self.find_for_type(ty).map(|_| ()))
    }

    /// Number of memoized reflectors
    pub fn len(&self) -> usize {
        self.reflectors.len()
    }

    /// Returns true if no reflector is memoized
    pub fn is_empty(&self) -> bool {
        self.reflectors.is_empty()
    }

    fn build(&self, ty: &TypeRc) -> Result<Reflector> {
        Reflector::new(
            ty,
            &self.registry,
            self.policy.clone(),
            self.config.max_hierarchy_depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{
        metadata::{
            member::MemberFlags,
            typesystem::{PrimitiveKind, TypeBuilder},
        },
        Error,
    };

    fn user_type(registry: &Arc<TypeRegistry>) -> TypeRc {
        TypeBuilder::class(registry.clone(), "demo", "User")
            .property("userName", &registry.string().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_cached_identity() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = user_type(&registry);
        let factory = ReflectorFactory::new(registry);

        let first = factory.find_for_type(&ty).unwrap();
        let second = factory.find_for_type(&ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_concurrent_identity() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = user_type(&registry);
        let factory = Arc::new(ReflectorFactory::new(registry));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = factory.clone();
                let ty = ty.clone();
                thread::spawn(move || factory.find_for_type(&ty).unwrap())
            })
            .collect();
        let reflectors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for reflector in &reflectors {
            assert!(Arc::ptr_eq(reflector, &reflectors[0]));
        }
        assert!(Arc::ptr_eq(&reflectors[0], &factory.find_for_type(&ty).unwrap()));
    }

    #[test]
    fn test_disabled_cache() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = user_type(&registry);
        let factory = ReflectorFactory::with_config(registry, ReflectorConfig::uncached());
        assert!(!factory.is_class_cache_enabled());

        let first = factory.find_for_type(&ty).unwrap();
        let second = factory.find_for_type(&ty).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_toggle_keeps_entries() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = user_type(&registry);
        let factory = ReflectorFactory::new(registry);

        let cached = factory.find_for_type(&ty).unwrap();
        factory.set_class_cache_enabled(false);
        let fresh = factory.find_for_type(&ty).unwrap();
        assert!(!Arc::ptr_eq(&cached, &fresh));
        assert_eq!(factory.len(), 1);

        factory.set_class_cache_enabled(true);
        assert!(Arc::ptr_eq(&cached, &factory.find_for_type(&ty).unwrap()));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let string = registry.string().unwrap();
        let base = TypeBuilder::class(registry.clone(), "demo", "Base")
            .method("getId", MemberFlags::PUBLIC, &int, vec![], None)
            .build()
            .unwrap();
        let broken = TypeBuilder::class(registry.clone(), "demo", "Broken")
            .extends(&base)
            .method("getId", MemberFlags::PUBLIC, &string, vec![], None)
            .build()
            .unwrap();
        let factory = ReflectorFactory::new(registry);

        assert!(matches!(
            factory.find_for_type(&broken),
            Err(Error::AmbiguousGetter { .. })
        ));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_preload() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let types: Vec<TypeRc> = (0..16)
            .map(|i| {
                TypeBuilder::class(registry.clone(), "bulk", &format!("T{i}"))
                    .property("value", &registry.get_primitive(PrimitiveKind::I8).unwrap())
                    .build()
                    .unwrap()
            })
            .collect();
        let factory = ReflectorFactory::new(registry);

        factory.preload(&types).unwrap();
        assert_eq!(factory.len(), types.len());
        for ty in &types {
            assert!(factory.find_for_type(ty).unwrap().has_setter("value"));
        }
    }

    #[test]
    fn test_restricted_policy() {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let ty = TypeBuilder::class(registry.clone(), "demo", "Hidden")
            .field(
                "secret",
                &registry.string().unwrap(),
                MemberFlags::PRIVATE,
            )
            .build()
            .unwrap();
        let factory = ReflectorFactory::with_config(registry, ReflectorConfig::restricted());
        assert!(!factory.access_policy().can_control_member_accessible());

        let reflector = factory.find_for_type(&ty).unwrap();
        let object = crate::metadata::value::Object::new(&ty).unwrap();
        assert!(matches!(
            reflector.get_invoker("secret").unwrap().invoke(&object, &[]),
            Err(Error::AccessDenied { .. })
        ));

        let permissive = ReflectorFactory::with_config(
            factory.registry().clone(),
            ReflectorConfig::restricted(),
        )
        .with_access_policy(Arc::new(StaticAccess(true)));
        let reflector = permissive.find_for_type(&ty).unwrap();
        assert!(reflector.get_invoker("secret").unwrap().invoke(&object, &[]).is_ok());
    }
}
