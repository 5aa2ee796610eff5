//! Authenticated instance listing for one hypervisor host.
//!
//! [`InstanceLister`] keeps a cached [`Credential`] in its [`Session`],
//! authenticates lazily, and re-authenticates when the compute API rejects
//! the token.
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use hostwatch_models::HostId;
//! use hostwatch_sdk::{InstanceLister, ListerConfig};
//!
//! # async fn run() -> Result<(), hostwatch_sdk::SdkError> {
//! let lister = InstanceLister::new(ListerConfig::from_env())?;
//!
//! // Distinguishes "no instances" from failures:
//! let servers = lister.fetch_instances_on_host(&HostId::new("compute-01")).await?;
//! println!("{} instance(s)", servers.len());
//!
//! // Never fails; empty on any error (logged):
//! let servers = lister.list_target_host().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::Utc;
use hostwatch_models::{Credential, HostId, ServerList, ServerRecord, TokenRequest, TokenResponse};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::config::ListerConfig;
use crate::endpoints::{ComputeEndpoints, AUTH_TOKEN_HEADER};
use crate::error::SdkError;
use crate::session::Session;

/// Lists the instances running on a hypervisor host.
pub struct InstanceLister {
    http: reqwest::Client,
    config: ListerConfig,
    session: Arc<Session>,
}

impl InstanceLister {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a lister with a fresh, empty session.
    pub fn new(config: ListerConfig) -> Result<Self, SdkError> {
        Self::with_session(config, Arc::new(Session::new()))
    }

    /// Create a lister that shares `session` with other holders.
    pub fn with_session(config: ListerConfig, session: Arc<Session>) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SdkError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Obtain a new credential from the identity endpoint.
    ///
    /// On success the session holds exactly the returned credential. On any
    /// failure (transport, status, body) the session is cleared; the error
    /// is logged and returned.
    pub async fn authenticate(&self) -> Result<Credential, SdkError> {
        let mut slot = self.session.lock().await;
        self.authenticate_locked(&mut slot).await
    }

    async fn authenticate_locked(
        &self,
        slot: &mut Option<Credential>,
    ) -> Result<Credential, SdkError> {
        match self.request_token().await {
            Ok(credential) => {
                info!(
                    tenant_id = %credential.tenant_id,
                    token = %credential.token.redacted(),
                    "authenticated"
                );
                *slot = Some(credential.clone());
                Ok(credential)
            }
            Err(e) => {
                *slot = None;
                error!(auth_url = %self.config.auth_url, error = %e, "authentication failed");
                Err(e)
            }
        }
    }

    async fn request_token(&self) -> Result<Credential, SdkError> {
        let body = TokenRequest::password(
            &self.config.admin_tenant,
            &self.config.admin_username,
            &self.config.admin_password,
        );

        let res = self
            .http
            .post(&self.config.auth_url)
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(SdkError::Auth(format!(
                "identity endpoint returned {status}: {text}"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&text)?;
        Ok(parsed.into_credential()?)
    }

    /// The cached credential, authenticating first when there is none or
    /// it has expired.
    async fn current_credential(&self) -> Result<Credential, SdkError> {
        let mut slot = self.session.lock().await;
        match &*slot {
            Some(credential) if !credential.is_expired_at(Utc::now()) => {
                return Ok(credential.clone());
            }
            Some(_) => debug!("cached credential expired"),
            None => {}
        }
        self.authenticate_locked(&mut slot).await
    }

    /// Replace a credential the compute API rejected. If the session no
    /// longer holds `rejected`, someone else already refreshed it.
    async fn refresh_after_rejection(
        &self,
        rejected: &Credential,
    ) -> Result<Credential, SdkError> {
        let mut slot = self.session.lock().await;
        if let Some(current) = &*slot {
            if current != rejected {
                debug!("credential already refreshed");
                return Ok(current.clone());
            }
        }
        self.authenticate_locked(&mut slot).await
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    /// List the instances on `host`, reporting why a listing failed.
    ///
    /// A response whose status is in
    /// [`reauth_statuses`](ListerConfig::reauth_statuses) forces
    /// re-authentication and another attempt, up to
    /// [`max_attempts`](ListerConfig::max_attempts); running out yields
    /// [`SdkError::RetriesExhausted`]. Any other non-200 status, a
    /// transport fault, or a malformed body ends the call immediately.
    pub async fn fetch_instances_on_host(
        &self,
        host: &HostId,
    ) -> Result<Vec<ServerRecord>, SdkError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0;

        while attempts < max_attempts {
            let credential = self.current_credential().await?;
            let res = self.request_servers(&credential, host).await?;
            let status = res.status();

            if status == StatusCode::OK {
                let list: ServerList = serde_json::from_str(&res.text().await?)?;
                debug!(host = %host, count = list.servers.len(), "instances listed");
                return Ok(list.servers);
            }

            if self.config.is_reauth_status(status) {
                attempts += 1;
                warn!(
                    host = %host,
                    %status,
                    attempt = attempts,
                    max_attempts,
                    "listing rejected, re-authenticating"
                );
                self.refresh_after_rejection(&credential).await?;
                continue;
            }

            let body = res.text().await.unwrap_or_default();
            return Err(SdkError::UnexpectedStatus { status, body });
        }

        Err(SdkError::RetriesExhausted { attempts })
    }

    /// List the instances on `host`; any failure is logged and yields an
    /// empty list.
    ///
    /// An empty result therefore does not prove the host is idle. Use
    /// [`fetch_instances_on_host`](Self::fetch_instances_on_host) when the
    /// difference matters.
    pub async fn list_instances_on_host(&self, host: &HostId) -> Vec<ServerRecord> {
        match self.fetch_instances_on_host(host).await {
            Ok(servers) => servers,
            Err(e @ SdkError::RetriesExhausted { .. }) => {
                warn!(host = %host, error = %e, "giving up on instance listing");
                Vec::new()
            }
            Err(e) => {
                error!(host = %host, error = %e, "instance listing failed");
                Vec::new()
            }
        }
    }

    /// [`list_instances_on_host`](Self::list_instances_on_host) for the
    /// configured target host.
    pub async fn list_target_host(&self) -> Vec<ServerRecord> {
        self.list_instances_on_host(&self.config.target_host).await
    }

    async fn request_servers(
        &self,
        credential: &Credential,
        host: &HostId,
    ) -> Result<reqwest::Response, SdkError> {
        let url =
            ComputeEndpoints::servers_detail(&self.config.api_url_prefix, &credential.tenant_id)?;
        let res = self
            .http
            .get(url)
            .query(&ComputeEndpoints::host_filter(host))
            .header(ACCEPT, "application/json")
            .header(AUTH_TOKEN_HEADER, credential.token.as_str())
            .send()
            .await?;
        Ok(res)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The configuration this lister was built with.
    pub fn config(&self) -> &ListerConfig {
        &self.config
    }

    /// The session holding the cached credential.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}
