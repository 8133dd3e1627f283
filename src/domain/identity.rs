use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::UserId;

/// Caller identity as produced by the authentication collaborator.
///
/// Role keys are kept as opaque strings here; only `RoleAuthority` compares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub roles: BTreeSet<String>,
}

impl Identity {
    pub fn new<I, S>(user_id: UserId, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
