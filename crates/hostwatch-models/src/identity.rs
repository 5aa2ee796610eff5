//! Identity service (Keystone v2 token API) payloads.
//!
//! ```text
//! POST /v2.0/tokens
//! {"auth": {"tenantName": "admin",
//!           "passwordCredentials": {"username": "admin", "password": "…"}}}
//!
//! 200 OK
//! {"access": {"token":  {"id": "…", "expires": "…", "tenant": {"id": "…"}},
//!             "tenant": {"id": "…"}}}
//! ```
//!
//! Deployments differ on where the tenant lives in the response, so
//! [`TokenResponse::into_credential`] accepts either location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::ModelError;
use crate::ids::{AuthToken, TenantId};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of the password authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// The single top-level `auth` object.
    pub auth: AuthPayload,
}

/// Tenant name plus username/password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Name (not id) of the tenant to scope the token to.
    #[serde(rename = "tenantName")]
    pub tenant_name: String,
    /// Username and password.
    #[serde(rename = "passwordCredentials")]
    pub password_credentials: PasswordCredentials,
}

/// Username/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
}

impl TokenRequest {
    /// Build a password authentication request.
    pub fn password(tenant_name: &str, username: &str, password: &str) -> Self {
        Self {
            auth: AuthPayload {
                tenant_name: tenant_name.to_string(),
                password_credentials: PasswordCredentials {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Successful authentication response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: Access,
}

/// The `access` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub token: TokenInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantRef>,
}

/// The `access.token` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantRef>,
}

/// A tenant reference; only `id` is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TokenResponse {
    /// Extract the credential: `access.token.id` plus the tenant id from
    /// `access.tenant.id`, falling back to `access.token.tenant.id`.
    ///
    /// Empty ids count as missing.
    pub fn into_credential(self) -> Result<Credential, ModelError> {
        let Access { token, tenant } = self.access;

        if token.id.is_empty() {
            return Err(ModelError::missing("access.token.id"));
        }

        let tenant_id = tenant
            .or(token.tenant)
            .map(|t| t.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ModelError::missing("access.tenant.id"))?;

        Ok(Credential {
            token: AuthToken::from(token.id),
            tenant_id: TenantId::from(tenant_id),
            expires_at: token.expires,
        })
    }
}
