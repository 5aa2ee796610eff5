//! Fake identity + compute API.
//!
//! Serves the two endpoints the instance lister talks to, on one listener:
//!
//! ```text
//! POST /v2.0/tokens                      ← password authentication
//! GET  /v2/{tenant_id}/servers/detail    ← host-filtered instance listing
//! ```
//!
//! Tests drive it through [`MockNova`]: queue token ids, script listing
//! responses (status, body, delay), slow down or break the token endpoint,
//! and read back call counters and the last listing request.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use hostwatch_models::{TokenRequest, HOST_ATTRIBUTE};
use serde_json::{json, Value};
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Static identity of the fake deployment.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub tenant_name: String,
    /// Tenant id returned by the token endpoint and expected in listing paths.
    pub tenant_id: String,
    /// Servers returned by unscripted listings, before host filtering.
    pub servers: Vec<Value>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
            tenant_name: "admin".to_string(),
            tenant_id: "0b3a1c7e5d2f4a6b8c9d0e1f2a3b4c5d".to_string(),
            servers: Vec::new(),
        }
    }
}

impl MockConfig {
    /// Replace the tenant id.
    pub fn with_tenant_id(mut self, tenant_id: &str) -> Self {
        self.tenant_id = tenant_id.to_string();
        self
    }

    /// Replace the seeded servers.
    pub fn with_servers(mut self, servers: Vec<Value>) -> Self {
        self.servers = servers;
        self
    }
}

/// A handful of instances spread over two hypervisors and two tenants.
pub fn sample_servers(tenant_id: &str) -> Vec<Value> {
    vec![
        json!({
            "id": "5c1d6e0a-1f2b-4c3d-8e4f-9a0b1c2d3e4f",
            "name": "web-01",
            "status": "ACTIVE",
            "tenant_id": tenant_id,
            "OS-EXT-SRV-ATTR:host": "compute-01",
            "OS-EXT-SRV-ATTR:instance_name": "instance-00000001"
        }),
        json!({
            "id": "7e2f8a1b-3c4d-4e5f-a6b7-c8d9e0f1a2b3",
            "name": "db-01",
            "status": "SHUTOFF",
            "tenant_id": "9f8e7d6c5b4a39281706f5e4d3c2b1a0",
            "OS-EXT-SRV-ATTR:host": "compute-01",
            "OS-EXT-SRV-ATTR:instance_name": "instance-00000002"
        }),
        json!({
            "id": "0a9b8c7d-6e5f-4a3b-2c1d-0e9f8a7b6c5d",
            "name": "batch-01",
            "status": "ACTIVE",
            "tenant_id": tenant_id,
            "OS-EXT-SRV-ATTR:host": "compute-02",
            "OS-EXT-SRV-ATTR:instance_name": "instance-00000003"
        }),
    ]
}

// ---------------------------------------------------------------------------
// Scripting
// ---------------------------------------------------------------------------

/// How the token endpoint shapes a successful (200) response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthBehavior {
    /// Tenant under both `access.tenant` and `access.token.tenant`.
    #[default]
    Valid,
    /// Tenant only under `access.token.tenant`.
    TokenScopedTenantOnly,
    /// `access.token.id` omitted.
    MissingTokenId,
    /// No tenant anywhere.
    MissingTenant,
    /// 200 with an HTML body.
    NotJson,
}

/// Body of a scripted listing response.
#[derive(Debug, Clone)]
pub enum ScriptedBody {
    Json(Value),
    Raw(String),
}

/// A canned response returned by the next listing call, ahead of the
/// normal token and tenant checks.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: ScriptedBody,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    /// Respond with `status` and a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ScriptedBody::Json(body),
            delay: None,
        }
    }

    /// Respond with `status` and a plain-text body.
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: ScriptedBody::Raw(body.to_string()),
            delay: None,
        }
    }

    /// Sleep before responding.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn respond(self) -> Response {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            ScriptedBody::Json(value) => (status, Json(value)).into_response(),
            ScriptedBody::Raw(text) => (status, text).into_response(),
        }
    }
}

/// What the last listing request carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedListRequest {
    pub tenant_id: String,
    pub token: Option<String>,
    pub accept: Option<String>,
    pub query: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct MockState {
    config: MockConfig,
    auth_behavior: Mutex<AuthBehavior>,
    auth_delay: Mutex<Option<Duration>>,
    auth_calls: AtomicUsize,
    list_calls: AtomicUsize,
    valid_tokens: Mutex<HashSet<String>>,
    queued_tokens: Mutex<VecDeque<String>>,
    list_script: Mutex<VecDeque<ScriptedResponse>>,
    last_list: Mutex<Option<RecordedListRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Addresses of a running mock.
#[derive(Debug, Clone)]
pub struct MockEndpoints {
    pub addr: SocketAddr,
    /// Full token endpoint URL.
    pub auth_url: String,
    /// Compute API prefix; the tenant id is appended to it.
    pub api_url: String,
}

/// Handle to a fake deployment. Clones share state.
#[derive(Clone)]
pub struct MockNova {
    state: Arc<MockState>,
}

impl MockNova {
    pub fn new(config: MockConfig) -> Self {
        Self {
            state: Arc::new(MockState {
                config,
                auth_behavior: Mutex::new(AuthBehavior::default()),
                auth_delay: Mutex::new(None),
                auth_calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
                valid_tokens: Mutex::new(HashSet::new()),
                queued_tokens: Mutex::new(VecDeque::new()),
                list_script: Mutex::new(VecDeque::new()),
                last_list: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.state.config
    }

    /// Build the axum router serving both APIs.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/v2.0/tokens", post(issue_token))
            .route("/v2/{tenant_id}/servers/detail", get(list_servers))
            .with_state(Arc::clone(&self.state))
    }

    /// Serve on an ephemeral loopback port in a background task.
    pub async fn spawn(&self) -> std::io::Result<MockEndpoints> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "mock-nova server stopped");
            }
        });
        debug!(%addr, "mock-nova spawned");
        Ok(MockEndpoints {
            addr,
            auth_url: format!("http://{addr}/v2.0/tokens"),
            api_url: format!("http://{addr}/v2"),
        })
    }

    // -- scripting ---------------------------------------------------------

    pub fn set_auth_behavior(&self, behavior: AuthBehavior) {
        *lock(&self.state.auth_behavior) = behavior;
    }

    /// Sleep for `delay` before answering every token request.
    pub fn set_auth_delay(&self, delay: Duration) {
        *lock(&self.state.auth_delay) = Some(delay);
    }

    /// Use `token` as the id of the next issued token.
    pub fn queue_token(&self, token: &str) {
        lock(&self.state.queued_tokens).push_back(token.to_string());
    }

    /// Treat `token` as valid without issuing it.
    pub fn accept_token(&self, token: &str) {
        lock(&self.state.valid_tokens).insert(token.to_string());
    }

    /// Invalidate every token issued or accepted so far.
    pub fn revoke_tokens(&self) {
        lock(&self.state.valid_tokens).clear();
    }

    /// Append a canned response for an upcoming listing call.
    pub fn push_list_response(&self, response: ScriptedResponse) {
        lock(&self.state.list_script).push_back(response);
    }

    // -- observation -------------------------------------------------------

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn last_list_request(&self) -> Option<RecordedListRequest> {
        lock(&self.state.last_list).clone()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {
            "code": 401,
            "title": "Unauthorized",
            "message": "The request you have made requires authentication."
        }})),
    )
        .into_response()
}

/// `POST /v2.0/tokens`
async fn issue_token(
    State(state): State<Arc<MockState>>,
    Json(req): Json<TokenRequest>,
) -> Response {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *lock(&state.auth_delay);
    if let Some(delay) = delay {
        debug!(?delay, "delaying token response");
        tokio::time::sleep(delay).await;
    }

    let cfg = &state.config;
    let creds = &req.auth.password_credentials;
    if req.auth.tenant_name != cfg.tenant_name
        || creds.username != cfg.username
        || creds.password != cfg.password
    {
        info!(username = %creds.username, tenant = %req.auth.tenant_name, "rejected credentials");
        return unauthorized();
    }

    let behavior = *lock(&state.auth_behavior);
    let token_id = lock(&state.queued_tokens)
        .pop_front()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let expires =
        (Utc::now() + chrono::Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let tenant = json!({"id": cfg.tenant_id, "name": cfg.tenant_name});

    let access = match behavior {
        AuthBehavior::NotJson => {
            return (StatusCode::OK, "<html><body>maintenance</body></html>").into_response();
        }
        AuthBehavior::Valid => json!({
            "token": {"id": token_id, "expires": expires, "tenant": tenant},
            "tenant": tenant
        }),
        AuthBehavior::TokenScopedTenantOnly => json!({
            "token": {"id": token_id, "expires": expires, "tenant": tenant}
        }),
        AuthBehavior::MissingTokenId => json!({
            "token": {"expires": expires},
            "tenant": tenant
        }),
        AuthBehavior::MissingTenant => json!({
            "token": {"id": token_id, "expires": expires}
        }),
    };

    if behavior != AuthBehavior::MissingTokenId {
        lock(&state.valid_tokens).insert(token_id.clone());
        info!(token = %token_id, tenant = %cfg.tenant_id, "token issued");
    }

    Json(json!({ "access": access })).into_response()
}

/// `GET /v2/{tenant_id}/servers/detail`
async fn list_servers(
    State(state): State<Arc<MockState>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.list_calls.fetch_add(1, Ordering::SeqCst);

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let token = header_str(header::HeaderName::from_static("x-auth-token"));
    *lock(&state.last_list) = Some(RecordedListRequest {
        tenant_id: tenant_id.clone(),
        token: token.clone(),
        accept: header_str(header::ACCEPT),
        query: query.clone(),
    });

    let scripted = lock(&state.list_script).pop_front();
    if let Some(response) = scripted {
        debug!(status = response.status, "serving scripted listing response");
        return response.respond().await;
    }

    let authorized = token
        .as_deref()
        .is_some_and(|t| lock(&state.valid_tokens).contains(t));
    if !authorized {
        return unauthorized();
    }

    if tenant_id != state.config.tenant_id {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"itemNotFound": {"code": 404, "message": "tenant not found"}})),
        )
            .into_response();
    }

    let host = query.get("host");
    let all_tenants = query
        .get("all_tenants")
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    let servers: Vec<Value> = state
        .config
        .servers
        .iter()
        .filter(|s| host.is_none_or(|h| s[HOST_ATTRIBUTE].as_str() == Some(h.as_str())))
        .filter(|s| all_tenants || s["tenant_id"].as_str() == Some(tenant_id.as_str()))
        .cloned()
        .collect();

    Json(json!({ "servers": servers })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_models::TokenResponse;

    const TENANT: &str = "tenant-under-test";

    async fn spawn_mock() -> (MockNova, MockEndpoints) {
        let mock = MockNova::new(
            MockConfig::default()
                .with_tenant_id(TENANT)
                .with_servers(sample_servers(TENANT)),
        );
        let endpoints = mock.spawn().await.expect("spawn mock");
        (mock, endpoints)
    }

    async fn login(endpoints: &MockEndpoints) -> reqwest::Response {
        reqwest::Client::new()
            .post(&endpoints.auth_url)
            .json(&TokenRequest::password("admin", "admin", "admin"))
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn issues_queued_token_with_both_tenant_locations() {
        let (mock, endpoints) = spawn_mock().await;
        mock.queue_token("T1");

        let res = login(&endpoints).await;
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["access"]["token"]["id"], "T1");
        assert_eq!(body["access"]["tenant"]["id"], TENANT);
        assert_eq!(body["access"]["token"]["tenant"]["id"], TENANT);

        let parsed: TokenResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.access.token.expires.is_some());
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (mock, endpoints) = spawn_mock().await;
        let res = reqwest::Client::new()
            .post(&endpoints.auth_url)
            .json(&TokenRequest::password("admin", "admin", "nope"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 401);
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn listing_filters_by_host_across_tenants() {
        let (mock, endpoints) = spawn_mock().await;
        mock.accept_token("T0");

        let res = reqwest::Client::new()
            .get(format!("{}/{TENANT}/servers/detail", endpoints.api_url))
            .query(&[("all_tenants", "1"), ("host", "compute-01")])
            .header("X-Auth-Token", "T0")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        let names: Vec<_> = body["servers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["web-01", "db-01"]);

        let recorded = mock.last_list_request().unwrap();
        assert_eq!(recorded.token.as_deref(), Some("T0"));
        assert_eq!(recorded.query.get("host").map(String::as_str), Some("compute-01"));
    }

    #[tokio::test]
    async fn listing_without_all_tenants_hides_foreign_instances() {
        let (mock, endpoints) = spawn_mock().await;
        mock.accept_token("T0");

        let body: Value = reqwest::Client::new()
            .get(format!("{}/{TENANT}/servers/detail", endpoints.api_url))
            .query(&[("host", "compute-01")])
            .header("X-Auth-Token", "T0")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["servers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let (mock, endpoints) = spawn_mock().await;
        mock.accept_token("T0");
        mock.revoke_tokens();

        let res = reqwest::Client::new()
            .get(format!("{}/{TENANT}/servers/detail", endpoints.api_url))
            .header("X-Auth-Token", "T0")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 401);
    }

    #[tokio::test]
    async fn scripted_responses_are_served_in_order() {
        let (mock, endpoints) = spawn_mock().await;
        mock.push_list_response(ScriptedResponse::json(413, json!({"overLimit": {}})));
        mock.push_list_response(ScriptedResponse::raw(200, "not json"));

        let client = reqwest::Client::new();
        let url = format!("{}/{TENANT}/servers/detail", endpoints.api_url);
        assert_eq!(client.get(&url).send().await.unwrap().status(), 413);
        let second = client.get(&url).send().await.unwrap();
        assert_eq!(second.status(), 200);
        assert_eq!(second.text().await.unwrap(), "not json");
        // Script drained: back to normal token checks.
        assert_eq!(client.get(&url).send().await.unwrap().status(), 401);
        assert_eq!(mock.list_calls(), 3);
    }

    #[tokio::test]
    async fn auth_delay_holds_back_token_response() {
        let (mock, endpoints) = spawn_mock().await;
        mock.set_auth_delay(Duration::from_millis(300));

        let started = tokio::time::Instant::now();
        let res = login(&endpoints).await;
        assert_eq!(res.status(), 200);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn not_json_mode_returns_html() {
        let (mock, endpoints) = spawn_mock().await;
        mock.set_auth_behavior(AuthBehavior::NotJson);
        let res = login(&endpoints).await;
        assert_eq!(res.status(), 200);
        assert!(res.text().await.unwrap().starts_with("<html>"));
    }
}
