//! Compute API URL and query construction.
//!
//! ```text
//! {api_url_prefix}/{tenant_id}/servers/detail?all_tenants=1&host={host}
//! ```

use hostwatch_models::{HostId, TenantId};
use reqwest::Url;

use crate::error::SdkError;

/// Header carrying the identity token on compute requests.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Builds the compute API locations used by the lister.
///
/// # Examples
///
/// ```
/// use hostwatch_models::TenantId;
/// use hostwatch_sdk::ComputeEndpoints;
///
/// let tenant = TenantId::new("U1");
/// let url = ComputeEndpoints::servers_detail("http://localhost:8774/v2/", &tenant)?;
/// assert_eq!(url.as_str(), "http://localhost:8774/v2/U1/servers/detail");
/// # Ok::<(), hostwatch_sdk::SdkError>(())
/// ```
pub struct ComputeEndpoints;

impl ComputeEndpoints {
    /// Detailed server listing for a tenant. A trailing `/` on the prefix
    /// is ignored; the tenant id is percent-encoded as one path segment.
    pub fn servers_detail(api_url_prefix: &str, tenant: &TenantId) -> Result<Url, SdkError> {
        let mut url = Url::parse(api_url_prefix).map_err(|e| {
            SdkError::Config(format!("invalid compute API prefix {api_url_prefix:?}: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                SdkError::Config(format!("compute API prefix {api_url_prefix:?} is not a base URL"))
            })?
            .pop_if_empty()
            .push(tenant.as_str())
            .push("servers")
            .push("detail");
        Ok(url)
    }

    /// Query selecting instances of every tenant that run on `host`.
    pub fn host_filter(host: &HostId) -> [(&'static str, String); 2] {
        [
            ("all_tenants", "1".to_string()),
            ("host", host.to_string()),
        ]
    }
}
