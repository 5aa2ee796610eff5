//! Lister configuration.
//!
//! Endpoints, admin credentials, the host to watch and the request policy.
//! Built from environment variables at startup; every value has a default
//! so a bare `from_env()` targets a local all-in-one deployment.

use std::fmt;
use std::time::Duration;

use hostwatch_models::HostId;
use reqwest::StatusCode;
use tracing::warn;

const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:5000/v2.0/tokens";
const DEFAULT_API_URL: &str = "http://localhost:8774/v2";
const DEFAULT_TIMEOUT_SECS: u64 = 3;
const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_REAUTH_STATUSES: [u16; 3] = [401, 403, 413];

/// Everything the [`InstanceLister`](crate::InstanceLister) needs to reach
/// the control plane.
#[derive(Clone)]
pub struct ListerConfig {
    /// Token endpoint (full URL, e.g. `http://keystone:5000/v2.0/tokens`).
    pub auth_url: String,
    /// Compute API prefix; `/<tenant_id>/servers/detail` is appended.
    pub api_url_prefix: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Tenant *name* to scope the token to.
    pub admin_tenant: String,
    /// Host listed by
    /// [`InstanceLister::list_target_host`](crate::InstanceLister::list_target_host).
    pub target_host: HostId,
    /// Upper bound on each identity and compute request.
    pub request_timeout: Duration,
    /// Listing attempts before giving up on rejections. At least 1.
    pub max_attempts: u32,
    /// Listing statuses that mean "token rejected": re-authenticate and retry.
    pub reauth_statuses: Vec<u16>,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url_prefix: DEFAULT_API_URL.to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            admin_tenant: "admin".to_string(),
            target_host: HostId::new("localhost"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            reauth_statuses: DEFAULT_REAUTH_STATUSES.to_vec(),
        }
    }
}

impl ListerConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                         | Default                              |
    /// |----------------------------------|--------------------------------------|
    /// | `HOSTWATCH_AUTH_URL`             | `http://127.0.0.1:5000/v2.0/tokens`  |
    /// | `HOSTWATCH_API_URL`              | `http://localhost:8774/v2`           |
    /// | `HOSTWATCH_ADMIN_USERNAME`       | `admin`                              |
    /// | `HOSTWATCH_ADMIN_PASSWORD`       | `admin`                              |
    /// | `HOSTWATCH_ADMIN_TENANT`         | `admin`                              |
    /// | `HOSTWATCH_TARGET_HOST`          | `$HOSTNAME`, else `localhost`        |
    /// | `HOSTWATCH_REQUEST_TIMEOUT_SECS` | `3`                                  |
    /// | `HOSTWATCH_MAX_ATTEMPTS`         | `2`                                  |
    /// | `HOSTWATCH_REAUTH_STATUSES`      | `401,403,413`                        |
    ///
    /// Values that fail to parse fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let target_host = lookup("HOSTWATCH_TARGET_HOST")
            .or_else(|| lookup("HOSTNAME"))
            .map(HostId::from)
            .unwrap_or(defaults.target_host);

        let request_timeout = parsed(&lookup, "HOSTWATCH_REQUEST_TIMEOUT_SECS", |v| {
            v.parse::<u64>().ok().filter(|secs| *secs > 0)
        })
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

        let max_attempts = parsed(&lookup, "HOSTWATCH_MAX_ATTEMPTS", |v| {
            v.parse::<u32>().ok().filter(|n| *n > 0)
        })
        .unwrap_or(defaults.max_attempts);

        let reauth_statuses = parsed(&lookup, "HOSTWATCH_REAUTH_STATUSES", parse_statuses)
            .unwrap_or(defaults.reauth_statuses);

        Self {
            auth_url: string("HOSTWATCH_AUTH_URL", defaults.auth_url),
            api_url_prefix: string("HOSTWATCH_API_URL", defaults.api_url_prefix),
            admin_username: string("HOSTWATCH_ADMIN_USERNAME", defaults.admin_username),
            admin_password: string("HOSTWATCH_ADMIN_PASSWORD", defaults.admin_password),
            admin_tenant: string("HOSTWATCH_ADMIN_TENANT", defaults.admin_tenant),
            target_host,
            request_timeout,
            max_attempts,
            reauth_statuses,
        }
    }

    /// Point the lister at a different identity endpoint and compute API.
    pub fn with_endpoints(mut self, auth_url: &str, api_url_prefix: &str) -> Self {
        self.auth_url = auth_url.to_string();
        self.api_url_prefix = api_url_prefix.to_string();
        self
    }

    /// Whether a listing response with `status` should trigger
    /// re-authentication.
    pub fn is_reauth_status(&self, status: StatusCode) -> bool {
        self.reauth_statuses.contains(&status.as_u16())
    }
}

impl fmt::Debug for ListerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListerConfig")
            .field("auth_url", &self.auth_url)
            .field("api_url_prefix", &self.api_url_prefix)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("admin_tenant", &self.admin_tenant)
            .field("target_host", &self.target_host)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("reauth_statuses", &self.reauth_statuses)
            .finish()
    }
}

/// Look `key` up and parse it, warning when a present value is rejected.
fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        warn!(variable = key, value = %raw, "ignoring invalid value, using default");
    }
    value
}

/// `"401, 403"` → `[401, 403]`. Rejects the whole list if any entry is not
/// an HTTP status code.
fn parse_statuses(raw: &str) -> Option<Vec<u16>> {
    let statuses: Option<Vec<u16>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u16>().ok().filter(|code| (100..=599).contains(code)))
        .collect();
    statuses.filter(|list| !list.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> ListerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_local_deployment() {
        let cfg = from_map(&[]);
        assert_eq!(cfg.auth_url, "http://127.0.0.1:5000/v2.0/tokens");
        assert_eq!(cfg.api_url_prefix, "http://localhost:8774/v2");
        assert_eq!(cfg.admin_tenant, "admin");
        assert_eq!(cfg.target_host, HostId::new("localhost"));
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.max_attempts, 2);
        assert_eq!(cfg.reauth_statuses, vec![401, 403, 413]);
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = from_map(&[
            ("HOSTWATCH_AUTH_URL", "http://keystone:5000/v2.0/tokens"),
            ("HOSTWATCH_API_URL", "http://nova:8774/v2/"),
            ("HOSTWATCH_ADMIN_PASSWORD", "s3cret"),
            ("HOSTWATCH_TARGET_HOST", "114-113-199-8"),
            ("HOSTWATCH_REQUEST_TIMEOUT_SECS", "10"),
            ("HOSTWATCH_MAX_ATTEMPTS", "5"),
            ("HOSTWATCH_REAUTH_STATUSES", "401, 403"),
        ]);
        assert_eq!(cfg.auth_url, "http://keystone:5000/v2.0/tokens");
        assert_eq!(cfg.api_url_prefix, "http://nova:8774/v2/");
        assert_eq!(cfg.admin_password, "s3cret");
        assert_eq!(cfg.target_host.as_str(), "114-113-199-8");
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.reauth_statuses, vec![401, 403]);
    }

    #[test]
    fn hostname_is_the_fallback_target() {
        let cfg = from_map(&[("HOSTNAME", "compute-07")]);
        assert_eq!(cfg.target_host.as_str(), "compute-07");

        let cfg = from_map(&[("HOSTNAME", "compute-07"), ("HOSTWATCH_TARGET_HOST", "other")]);
        assert_eq!(cfg.target_host.as_str(), "other");
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = from_map(&[
            ("HOSTWATCH_REQUEST_TIMEOUT_SECS", "soon"),
            ("HOSTWATCH_MAX_ATTEMPTS", "0"),
            ("HOSTWATCH_REAUTH_STATUSES", "401,forbidden"),
        ]);
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.max_attempts, 2);
        assert_eq!(cfg.reauth_statuses, vec![401, 403, 413]);
    }

    #[test]
    fn status_list_parsing() {
        assert_eq!(parse_statuses("413"), Some(vec![413]));
        assert_eq!(parse_statuses(" 401 ,403,"), Some(vec![401, 403]));
        assert_eq!(parse_statuses(""), None);
        assert_eq!(parse_statuses("999"), None);
    }

    #[test]
    fn reauth_status_membership() {
        let cfg = ListerConfig::default();
        assert!(cfg.is_reauth_status(StatusCode::UNAUTHORIZED));
        assert!(cfg.is_reauth_status(StatusCode::PAYLOAD_TOO_LARGE));
        assert!(!cfg.is_reauth_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = from_map(&[("HOSTWATCH_ADMIN_PASSWORD", "hunter2")]);
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
