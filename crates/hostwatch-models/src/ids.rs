//! Identifier newtypes shared by the identity and compute APIs.
//!
//! A [`TenantId`] names the project namespace that owns resources, a
//! [`HostId`] names the hypervisor whose instances are listed, and an
//! [`AuthToken`] is the opaque credential string sent on every compute
//! request.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TenantId
// ---------------------------------------------------------------------------

/// Identifier of a tenant (project) as issued by the identity service.
///
/// The compute API scopes its URLs by tenant, so the listing endpoint is
/// derived from this value.
///
/// # Examples
///
/// ```
/// use hostwatch_models::TenantId;
///
/// let id = TenantId::new("f7ac731cc11f40efbc03a9f9e1d1d21f");
/// assert_eq!(id.to_string(), "f7ac731cc11f40efbc03a9f9e1d1d21f");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new `TenantId` from a string slice.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for TenantId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// HostId
// ---------------------------------------------------------------------------

/// Hostname of a hypervisor, as the compute API reports it in
/// `OS-EXT-SRV-ATTR:host`.
///
/// # Examples
///
/// ```
/// use hostwatch_models::HostId;
///
/// let host: HostId = "compute-01".parse().unwrap();
/// assert_eq!(host.as_str(), "compute-01");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostId(String);

impl HostId {
    /// Create a new `HostId` from a string slice.
    pub fn new(host: &str) -> Self {
        Self(host.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for HostId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AuthToken
// ---------------------------------------------------------------------------

/// Number of leading characters kept by [`AuthToken::redacted`].
const REDACTED_PREFIX_LEN: usize = 8;

/// Opaque token sent in the `X-Auth-Token` header.
///
/// `Debug` never prints the full value; use [`AuthToken::redacted`] when a
/// token needs to appear in logs.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Create a new `AuthToken` from a string slice.
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    /// Return the full token, e.g. for use in a request header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A log-safe rendering: the first few characters followed by `…`.
    ///
    /// ```
    /// use hostwatch_models::AuthToken;
    ///
    /// assert_eq!(AuthToken::new("0123456789abcdef").redacted(), "01234567…");
    /// assert_eq!(AuthToken::new("T1").redacted(), "T1…");
    /// ```
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(REDACTED_PREFIX_LEN).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&self.redacted()).finish()
    }
}

impl From<&str> for AuthToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AuthToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_id_parses_from_str() {
        let host: HostId = "114-113-199-8".parse().unwrap();
        assert_eq!(host, HostId::new("114-113-199-8"));
    }

    #[test]
    fn tenant_id_parses_from_str() {
        let tenant: TenantId = "f7ac731cc11f40efbc03a9f9e1d1d21f".parse().unwrap();
        assert_eq!(tenant.as_str(), "f7ac731cc11f40efbc03a9f9e1d1d21f");
    }

    #[test]
    fn tenant_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&TenantId::new("U1")).unwrap();
        assert_eq!(json, "\"U1\"");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("gAAAAABsecretsecretsecret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secretsecret"));
        assert!(debug.contains("gAAAAABs"));
    }

    #[test]
    fn redacted_handles_multibyte_tokens() {
        let token = AuthToken::new("ééééééééééé");
        assert_eq!(token.redacted(), "éééééééé…");
    }
}
