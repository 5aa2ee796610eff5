//! Standalone fake control plane for running the poller locally.
//!
//! ```text
//! MOCK_NOVA_PORT=8774 cargo run -p mock-nova
//! HOSTWATCH_AUTH_URL=http://localhost:8774/v2.0/tokens \
//! HOSTWATCH_API_URL=http://localhost:8774/v2 \
//! HOSTWATCH_TARGET_HOST=compute-01 cargo run -p hostwatch-poller -- --once
//! ```

use mock_nova::{sample_servers, MockConfig, MockNova};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("MOCK_NOVA_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8774);

    let config = MockConfig::default();
    let servers = sample_servers(&config.tenant_id);
    let mock = MockNova::new(config.with_servers(servers));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        tenant_id = %mock.config().tenant_id,
        "mock-nova listening (admin/admin, tenant admin)"
    );
    axum::serve(listener, mock.router()).await
}
