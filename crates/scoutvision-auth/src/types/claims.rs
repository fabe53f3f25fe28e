//! Claims supplied by the external identity source.

use serde::{Deserialize, Serialize};

/// Roles, tenant and category asserted for an authenticated subject.
///
/// The subject itself is passed separately; everything here ends up inside
/// the signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectClaims {
    /// Granted roles.
    pub roles: Vec<String>,

    /// Tenant the subject belongs to.
    pub tenant_id: String,

    /// Feature category used for access restriction.
    pub category: String,
}

impl SubjectClaims {
    /// Creates a claim set.
    #[must_use]
    pub fn new(
        roles: impl IntoIterator<Item = impl Into<String>>,
        tenant_id: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            tenant_id: tenant_id.into(),
            category: category.into(),
        }
    }

    /// Returns `true` if the given role was granted.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
