//! Signer authorization.
//!
//! A credential is authorized for an action when its identity hash equals
//! the stored hash of a role the action accepts. Rejections name the role
//! only; the stored hashes never appear in errors or logs.

use solocommit_types::{
    CommitError, CommitmentParameters, Result, Role, SettlementAction, SigningCredential,
};
use tracing::warn;

/// Check `credential` against the role `action` requires.
///
/// Returns the concrete role the credential matched (`Owner` or `Arbiter`).
/// When owner and arbiter are the same identity, `Arbiter` wins.
///
/// # Errors
/// [`CommitError::Unauthorized`] if the credential belongs to no accepted role.
pub fn authorize(
    action: SettlementAction,
    credential: &SigningCredential,
    parameters: &CommitmentParameters,
) -> Result<Role> {
    let identity = credential.identity_hash();
    let is_owner = identity == *parameters.owner_hash();
    let is_arbiter = identity == *parameters.arbiter_hash();

    let required = action.required_role();
    let matched = match required {
        Role::Arbiter => is_arbiter.then_some(Role::Arbiter),
        Role::Owner => is_owner.then_some(Role::Owner),
        Role::OwnerOrArbiter => {
            if is_arbiter {
                Some(Role::Arbiter)
            } else {
                is_owner.then_some(Role::Owner)
            }
        }
    };

    matched.ok_or_else(|| {
        warn!(action = %action, role = %required, "Rejected settlement credential");
        CommitError::Unauthorized {
            action,
            role: required,
        }
    })
}
