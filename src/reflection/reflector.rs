//! Per-type accessor tables.
//!
//! A [`Reflector`] is built once for a [`RuntimeType`](crate::metadata::typesystem::RuntimeType)
//! and answers every later "how do I read or write property X" question without touching the
//! type's members again.
//!
//! # Construction
//!
//! 1. The zero-argument constructor among the type's own constructors becomes the default
//!    constructor.
//! 2. Methods are harvested from the class chain (own type first) and the interfaces each class
//!    implements, keyed by erased signature. The first method seen for a signature wins, so an
//!    override always hides what it overrides. Bridge methods are skipped.
//! 3. Getters (`get<Name>`, or `is<Name>` returning a primitive boolean) are grouped by property
//!    and folded: the more specific return type wins, and for two boolean getters the `is` form
//!    wins. Anything else is an [`crate::Error::AmbiguousGetter`].
//! 4. Setters (`set<Name>` with one parameter) are grouped by property. A setter accepting
//!    exactly the getter's type wins outright, otherwise the more specific parameter type wins.
//!    Unrelated parameter types are an [`crate::Error::AmbiguousSetter`] unless a later setter
//!    matches the getter's type.
//! 5. Fields of the class chain fill in every property that has no accessor method yet.
//!    `static final` fields are never writable.
//! 6. All readable and writable names are indexed by their upper-case form.

use std::{collections::HashMap, fmt, sync::Arc};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    error::PropertyAccess,
    metadata::{
        member::{Accessible, ConstructorRc, FieldRc, MethodRc},
        token::Token,
        typesystem::{TypeRc, TypeRegistry},
    },
    reflection::{
        access::AccessPolicy,
        invoker::{GetFieldInvoker, InvokerRc, MethodInvoker, SetFieldInvoker},
        namer::{is_valid_property_name, method_to_property, AccessorRole},
    },
    Error::{AmbiguousGetter, AmbiguousSetter, MissingDefaultConstructor, UnknownProperty},
    Result,
};

/// Erased signature of a method: return type, name and parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    return_type: Token,
    name: String,
    params: Vec<Token>,
}

/// A harvested method together with its erased types
struct Candidate {
    method: MethodRc,
    return_type: TypeRc,
    param_types: Vec<TypeRc>,
}

impl Candidate {
    fn declaring_type_name(&self) -> String {
        self.method
            .declaring_type()
            .map_or_else(|| "<dropped>".to_string(), |t| t.fullname())
    }
}

/// Resolves the property to accessor mapping of one runtime type.
pub struct Reflector {
    /// The reflected type
    ty: TypeRc,
    /// Names of all readable properties, in resolution order
    readable_property_names: Vec<String>,
    /// Names of all writable properties, in resolution order
    writable_property_names: Vec<String>,
    /// Property name to read accessor
    get_methods: IndexMap<String, InvokerRc>,
    /// Property name to write accessor
    set_methods: IndexMap<String, InvokerRc>,
    /// Property name to erased read type
    get_types: HashMap<String, TypeRc>,
    /// Property name to erased write type
    set_types: HashMap<String, TypeRc>,
    /// The declared zero-argument constructor
    default_constructor: Option<ConstructorRc>,
    /// Upper-cased property name to canonical property name
    case_insensitive_property_map: HashMap<String, String>,
}

impl Reflector {
    /// Build the accessor table of `ty`.
    ///
    /// ## Arguments
    /// * 'ty'        - The type to reflect
    /// * 'registry'  - Registry used to erase declared member types
    /// * 'policy'    - Escalation policy handed to every accessor
    /// * 'max_depth' - Bound for walks over the class chain
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousGetter`] or [`crate::Error::AmbiguousSetter`] for
    /// irreconcilable accessors, [`crate::Error::RecursionLimit`] for class chains deeper than
    /// `max_depth`, or [`crate::Error::Malformed`] if a declared type has been dropped.
    pub fn new(
        ty: &TypeRc,
        registry: &TypeRegistry,
        policy: Arc<dyn AccessPolicy>,
        max_depth: usize,
    ) -> Result<Self> {
        let chain = ty.class_chain(max_depth)?;
        let mut reflector = Reflector {
            ty: ty.clone(),
            readable_property_names: Vec::new(),
            writable_property_names: Vec::new(),
            get_methods: IndexMap::new(),
            set_methods: IndexMap::new(),
            get_types: HashMap::new(),
            set_types: HashMap::new(),
            default_constructor: None,
            case_insensitive_property_map: HashMap::new(),
        };

        reflector.add_default_constructor();
        let candidates = Self::class_methods(&chain, registry)?;
        reflector.add_get_methods(&candidates, &policy)?;
        reflector.add_set_methods(&candidates, &policy)?;
        reflector.add_fields(&chain, registry, &policy)?;

        reflector.readable_property_names = reflector.get_methods.keys().cloned().collect();
        reflector.writable_property_names = reflector.set_methods.keys().cloned().collect();
        for name in reflector
            .readable_property_names
            .iter()
            .chain(reflector.writable_property_names.iter())
        {
            reflector
                .case_insensitive_property_map
                .insert(name.to_uppercase(), name.clone());
        }

        debug!(
            type_name = %ty.fullname(),
            readable = reflector.readable_property_names.len(),
            writable = reflector.writable_property_names.len(),
            default_constructor = reflector.default_constructor.is_some(),
            "built reflector"
        );
        Ok(reflector)
    }

    fn add_default_constructor(&mut self) {
        self.default_constructor = self
            .ty
            .constructors
            .iter()
            .map(|(_, ctor)| ctor)
            .find(|ctor| ctor.param_count() == 0)
            .cloned();
    }

    /// Every uniquely-signatured method of the class chain and the implemented interfaces, in
    /// discovery order.
    fn class_methods(chain: &[TypeRc], registry: &TypeRegistry) -> Result<Vec<Candidate>> {
        let mut unique: IndexMap<Signature, Candidate> = IndexMap::new();
        for class in chain {
            Self::add_unique_methods(&mut unique, class, registry)?;
            for (_, interface) in class.interfaces.iter() {
                let Some(interface) = interface.upgrade() else {
                    continue;
                };
                Self::add_unique_methods(&mut unique, &interface, registry)?;
                for inherited in interface.all_interfaces() {
                    Self::add_unique_methods(&mut unique, &inherited, registry)?;
                }
            }
        }
        Ok(unique.into_values().collect())
    }

    fn add_unique_methods(
        unique: &mut IndexMap<Signature, Candidate>,
        ty: &TypeRc,
        registry: &TypeRegistry,
    ) -> Result<()> {
        for (_, method) in ty.methods.iter() {
            if method.is_bridge() {
                continue;
            }

            let return_type = method.return_type.erasure(registry)?;
            let param_types = method
                .params
                .iter()
                .map(|param| param.erasure(registry))
                .collect::<Result<Vec<_>>>()?;
            let signature = Signature {
                return_type: return_type.token,
                name: method.name.clone(),
                params: param_types.iter().map(|param| param.token).collect(),
            };

            unique.entry(signature).or_insert_with(|| Candidate {
                method: method.clone(),
                return_type,
                param_types,
            });
        }
        Ok(())
    }

    fn add_get_methods(
        &mut self,
        candidates: &[Candidate],
        policy: &Arc<dyn AccessPolicy>,
    ) -> Result<()> {
        let mut conflicting: IndexMap<String, Vec<&Candidate>> = IndexMap::new();
        for candidate in candidates {
            if !candidate.param_types.is_empty() {
                continue;
            }
            let is_getter = match AccessorRole::classify(&candidate.method.name) {
                Some(AccessorRole::Get) => true,
                Some(AccessorRole::Is) => candidate.return_type.is_boolean(),
                _ => false,
            };
            if is_getter {
                let property = method_to_property(&candidate.method.name)?;
                conflicting.entry(property).or_default().push(candidate);
            }
        }

        for (property, getters) in conflicting {
            let winner = Self::resolve_getter_conflict(&property, &getters)?;
            if is_valid_property_name(&property) {
                let invoker: InvokerRc = Arc::new(MethodInvoker::new(
                    winner.method.clone(),
                    winner.return_type.clone(),
                    policy.clone(),
                ));
                self.get_types
                    .insert(property.clone(), winner.return_type.clone());
                self.get_methods.insert(property, invoker);
            }
        }
        Ok(())
    }

    fn resolve_getter_conflict<'c>(
        property: &str,
        getters: &[&'c Candidate],
    ) -> Result<&'c Candidate> {
        let mut getters = getters.iter().copied();
        let mut winner = getters
            .next()
            .ok_or_else(|| malformed_error!("No getter candidates for '{}'", property))?;

        for candidate in getters {
            let winner_type = &winner.return_type;
            let candidate_type = &candidate.return_type;
            if candidate_type.token == winner_type.token {
                if !candidate_type.is_boolean() {
                    return Err(AmbiguousGetter {
                        property: property.to_string(),
                        declaring_type: winner.declaring_type_name(),
                    });
                }
                if AccessorRole::classify(&candidate.method.name) == Some(AccessorRole::Is) {
                    winner = candidate;
                }
            } else if candidate_type.is_assignable_from(winner_type) {
                // winner already has the more specific type
            } else if winner_type.is_assignable_from(candidate_type) {
                winner = candidate;
            } else {
                return Err(AmbiguousGetter {
                    property: property.to_string(),
                    declaring_type: winner.declaring_type_name(),
                });
            }
        }
        Ok(winner)
    }

    fn add_set_methods(
        &mut self,
        candidates: &[Candidate],
        policy: &Arc<dyn AccessPolicy>,
    ) -> Result<()> {
        let mut conflicting: IndexMap<String, Vec<&Candidate>> = IndexMap::new();
        for candidate in candidates {
            if candidate.param_types.len() == 1
                && AccessorRole::classify(&candidate.method.name) == Some(AccessorRole::Set)
            {
                let property = method_to_property(&candidate.method.name)?;
                conflicting.entry(property).or_default().push(candidate);
            }
        }

        for (property, setters) in conflicting {
            let winner = self.resolve_setter_conflict(&property, &setters)?;
            if is_valid_property_name(&property) {
                let param_type = winner.param_types[0].clone();
                let invoker: InvokerRc = Arc::new(MethodInvoker::new(
                    winner.method.clone(),
                    param_type.clone(),
                    policy.clone(),
                ));
                self.set_types.insert(property.clone(), param_type);
                self.set_methods.insert(property, invoker);
            }
        }
        Ok(())
    }

    fn resolve_setter_conflict<'c>(
        &self,
        property: &str,
        setters: &[&'c Candidate],
    ) -> Result<&'c Candidate> {
        let getter_type = self.get_types.get(property);
        let mut matched: Option<&'c Candidate> = None;
        let mut ambiguity = None;

        for &setter in setters {
            let param_type = &setter.param_types[0];
            if getter_type.is_some_and(|getter| getter.token == param_type.token) {
                return Ok(setter);
            }
            if ambiguity.is_none() {
                match Self::pick_better_setter(matched, setter, property) {
                    Ok(better) => matched = Some(better),
                    Err(error) => {
                        matched = None;
                        ambiguity = Some(error);
                    }
                }
            }
        }

        match (matched, ambiguity) {
            (Some(setter), _) => Ok(setter),
            (None, Some(error)) => Err(error),
            (None, None) => Err(malformed_error!("No setter candidates for '{}'", property)),
        }
    }

    fn pick_better_setter<'c>(
        current: Option<&'c Candidate>,
        candidate: &'c Candidate,
        property: &str,
    ) -> Result<&'c Candidate> {
        let Some(current) = current else {
            return Ok(candidate);
        };

        let current_type = &current.param_types[0];
        let candidate_type = &candidate.param_types[0];
        if current_type.is_assignable_from(candidate_type) {
            Ok(candidate)
        } else if candidate_type.is_assignable_from(current_type) {
            Ok(current)
        } else {
            Err(AmbiguousSetter {
                property: property.to_string(),
                declaring_type: candidate.declaring_type_name(),
                first: current_type.fullname(),
                second: candidate_type.fullname(),
            })
        }
    }

    fn add_fields(
        &mut self,
        chain: &[TypeRc],
        registry: &TypeRegistry,
        policy: &Arc<dyn AccessPolicy>,
    ) -> Result<()> {
        for class in chain {
            for (_, field) in class.fields.iter() {
                if !is_valid_property_name(&field.name) {
                    continue;
                }
                if !self.set_methods.contains_key(&field.name) && !field.flags.is_constant() {
                    self.add_set_field(field, registry, policy)?;
                }
                if !self.get_methods.contains_key(&field.name) {
                    self.add_get_field(field, registry, policy)?;
                }
            }
        }
        Ok(())
    }

    fn add_set_field(
        &mut self,
        field: &FieldRc,
        registry: &TypeRegistry,
        policy: &Arc<dyn AccessPolicy>,
    ) -> Result<()> {
        let field_type = field.field_type.erasure(registry)?;
        let invoker: InvokerRc = Arc::new(SetFieldInvoker::new(
            field.clone(),
            field_type.clone(),
            policy.clone(),
        ));
        self.set_types.insert(field.name.clone(), field_type);
        self.set_methods.insert(field.name.clone(), invoker);
        Ok(())
    }

    fn add_get_field(
        &mut self,
        field: &FieldRc,
        registry: &TypeRegistry,
        policy: &Arc<dyn AccessPolicy>,
    ) -> Result<()> {
        let field_type = field.field_type.erasure(registry)?;
        let invoker: InvokerRc = Arc::new(GetFieldInvoker::new(
            field.clone(),
            field_type.clone(),
            policy.clone(),
        ));
        self.get_types.insert(field.name.clone(), field_type);
        self.get_methods.insert(field.name.clone(), invoker);
        Ok(())
    }

    fn unknown(&self, kind: PropertyAccess, property: &str) -> crate::Error {
        UnknownProperty {
            kind,
            property: property.to_string(),
            type_name: self.ty.fullname(),
        }
    }

    /// The reflected type
    pub fn runtime_type(&self) -> &TypeRc {
        &self.ty
    }

    /// The declared zero-argument constructor
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingDefaultConstructor`] if the type declares none.
    pub fn default_constructor(&self) -> Result<&ConstructorRc> {
        self.default_constructor
            .as_ref()
            .ok_or_else(|| MissingDefaultConstructor(self.ty.fullname()))
    }

    /// Whether the type declares a zero-argument constructor
    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor.is_some()
    }

    /// The read accessor of `property`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if the property is not readable.
    pub fn get_invoker(&self, property: &str) -> Result<InvokerRc> {
        self.get_methods
            .get(property)
            .cloned()
            .ok_or_else(|| self.unknown(PropertyAccess::Read, property))
    }

    /// The write accessor of `property`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if the property is not writable.
    pub fn set_invoker(&self, property: &str) -> Result<InvokerRc> {
        self.set_methods
            .get(property)
            .cloned()
            .ok_or_else(|| self.unknown(PropertyAccess::Write, property))
    }

    /// The erased type read from `property`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if the property is not readable.
    pub fn getter_type(&self, property: &str) -> Result<TypeRc> {
        self.get_types
            .get(property)
            .cloned()
            .ok_or_else(|| self.unknown(PropertyAccess::Read, property))
    }

    /// The erased type written to `property`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if the property is not writable.
    pub fn setter_type(&self, property: &str) -> Result<TypeRc> {
        self.set_types
            .get(property)
            .cloned()
            .ok_or_else(|| self.unknown(PropertyAccess::Write, property))
    }

    /// Names of all readable properties
    pub fn readable_property_names(&self) -> &[String] {
        &self.readable_property_names
    }

    /// Names of all writable properties
    pub fn writable_property_names(&self) -> &[String] {
        &self.writable_property_names
    }

    /// Whether `property` has a read accessor
    pub fn has_getter(&self, property: &str) -> bool {
        self.get_methods.contains_key(property)
    }

    /// Whether `property` has a write accessor
    pub fn has_setter(&self, property: &str) -> bool {
        self.set_methods.contains_key(property)
    }

    /// The canonical spelling of `name`, compared case-insensitively
    pub fn find_property_name(&self, name: &str) -> Option<&str> {
        self.case_insensitive_property_map
            .get(&name.to_uppercase())
            .map(String::as_str)
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("type", &self.ty.fullname())
            .field("readable", &self.readable_property_names)
            .field("writable", &self.writable_property_names)
            .field("default_constructor", &self.default_constructor.is_some())
            .finish()
    }
}
