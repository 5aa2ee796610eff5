//! The token/tenant pair obtained from the identity service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AuthToken, TenantId};

/// A usable credential: token and tenant are always present together.
///
/// "No credential" is expressed as `Option<Credential>::None` by the holder,
/// never by a half-filled value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Token sent as `X-Auth-Token`.
    pub token: AuthToken,
    /// Tenant the token is scoped to; selects the compute API path.
    pub tenant_id: TenantId,
    /// Expiry reported by the identity service, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential without a known expiry.
    pub fn new(token: impl Into<AuthToken>, tenant_id: impl Into<TenantId>) -> Self {
        Self {
            token: token.into(),
            tenant_id: tenant_id.into(),
            expires_at: None,
        }
    }

    /// Attach an expiry timestamp.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the reported expiry lies at or before `now`.
    ///
    /// A credential with no reported expiry never expires locally; the
    /// compute API rejecting it is what triggers a refresh.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}
