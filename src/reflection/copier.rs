//! Field-by-field object copy.

use std::sync::Arc;

use tracing::trace;

use crate::{
    metadata::{
        typesystem::{TypeRc, MAX_HIERARCHY_DEPTH},
        value::ObjectRc,
    },
    reflection::access::{with_escalation, AccessPolicy, StaticAccess},
    Result,
};

/// Copies every field of a type and its superclasses from one object to another.
///
/// Fields that cannot be copied (for instance `static final` ones, or private ones when the
/// policy forbids escalation) are skipped.
pub struct PropertyCopier {
    policy: Arc<dyn AccessPolicy>,
    max_depth: usize,
}

impl Default for PropertyCopier {
    fn default() -> Self {
        PropertyCopier {
            policy: Arc::new(StaticAccess(true)),
            max_depth: MAX_HIERARCHY_DEPTH,
        }
    }
}

impl PropertyCopier {
    /// Create a copier consulting `policy` for fields that refuse access
    ///
    /// ## Arguments
    /// * 'policy' - The escalation policy
    pub fn new(policy: Arc<dyn AccessPolicy>) -> Self {
        PropertyCopier {
            policy,
            ..Self::default()
        }
    }

    /// Copy the fields declared by `ty` and its superclasses from `source` to `destination`.
    ///
    /// Returns the number of fields copied.
    ///
    /// ## Arguments
    /// * 'ty'          - The type whose fields are copied, usually a common supertype
    /// * 'source'      - Object read from
    /// * 'destination' - Object written to
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the class chain of `ty` is too deep. Per-field
    /// failures are not reported.
    pub fn copy_properties(
        &self,
        ty: &TypeRc,
        source: &ObjectRc,
        destination: &ObjectRc,
    ) -> Result<usize> {
        let mut copied = 0;
        for class in ty.class_chain(self.max_depth)? {
            for (_, field) in class.fields.iter() {
                let result = with_escalation(self.policy.as_ref(), field.as_ref(), || {
                    let value = field.get(source)?;
                    field.set(destination, value)
                });
                match result {
                    Ok(()) => copied += 1,
                    Err(error) => trace!(
                        type_name = %class.fullname(),
                        field = %field.name,
                        %error,
                        "skipped field copy"
                    ),
                }
            }
        }
        Ok(copied)
    }
}
