//! Privilege escalation for member access.
//!
//! Every accessor first tries the plain access. If the member refuses with
//! [`crate::Error::AccessDenied`] the [`AccessPolicy`] is consulted once; when it allows
//! bypassing access checks the member is made accessible and the access is retried exactly
//! once. Otherwise the original failure propagates unchanged.

use tracing::debug;

use crate::{metadata::member::Accessible, Error, Result};

/// Decides whether this process may suppress member access checks.
pub trait AccessPolicy: Send + Sync {
    /// Whether access checks of individual members may be suppressed
    fn can_control_member_accessible(&self) -> bool;
}

/// A fixed answer, configured up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAccess(pub bool);

impl AccessPolicy for StaticAccess {
    fn can_control_member_accessible(&self) -> bool {
        self.0
    }
}

/// Run `access`, retrying once after making `member` accessible if it was refused and
/// `policy` permits escalation.
///
/// ## Arguments
/// * 'policy' - The escalation policy to consult
/// * 'member' - The member whose access checks get suppressed
/// * 'access' - The operation, run at most twice
///
/// # Errors
/// Returns the error of the first attempt if it was not an access refusal or escalation is not
/// permitted, otherwise the result of the retry.
pub fn with_escalation<T, A, F>(policy: &dyn AccessPolicy, member: &A, mut access: F) -> Result<T>
where
    A: Accessible + ?Sized,
    F: FnMut() -> Result<T>,
{
    match access() {
        Err(Error::AccessDenied { .. }) if policy.can_control_member_accessible() => {
            member.set_accessible(true);
            debug!(
                member = member.member_name(),
                declaring_type = ?member.declaring_type().map(|t| t.fullname()),
                "suppressed member access checks"
            );
            access()
        }
        result => result,
    }
}
