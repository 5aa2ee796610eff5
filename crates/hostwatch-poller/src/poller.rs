//! Interval-driven host polling.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use hostwatch_models::HostId;
use hostwatch_sdk::{InstanceLister, SdkError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::snapshot::InstanceSnapshot;

/// Polls one host with a shared [`InstanceLister`].
pub struct Poller {
    lister: InstanceLister,
    host: HostId,
    interval: Duration,
}

impl Poller {
    pub fn new(lister: InstanceLister, host: HostId, interval: Duration) -> Self {
        Self {
            lister,
            host,
            interval,
        }
    }

    /// Poll once. Failures are logged and produce no snapshot, so a
    /// downstream consumer never mistakes a failed poll for an idle host.
    pub async fn poll_once(&self) -> Option<InstanceSnapshot> {
        let polled_at = Utc::now();
        match self.lister.fetch_instances_on_host(&self.host).await {
            Ok(instances) => {
                debug!(host = %self.host, count = instances.len(), "poll succeeded");
                Some(InstanceSnapshot::new(self.host.clone(), polled_at, instances))
            }
            Err(e @ SdkError::RetriesExhausted { .. }) => {
                warn!(host = %self.host, error = %e, "poll skipped: token kept being rejected");
                None
            }
            Err(e) => {
                error!(host = %self.host, error = %e, "poll failed");
                None
            }
        }
    }

    /// Poll on every tick and write one JSON line per snapshot to `out`.
    ///
    /// Returns after the first tick when `once` is set, otherwise on Ctrl-C.
    pub async fn run<W: Write>(&self, mut out: W, once: bool) -> Result<()> {
        info!(
            host = %self.host,
            interval_secs = self.interval.as_secs(),
            once,
            "poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(snapshot) = self.poll_once().await {
                        writeln!(out, "{}", snapshot.to_json_line()?)?;
                        out.flush()?;
                    }
                    if once {
                        return Ok(());
                    }
                }
                _ = &mut shutdown => {
                    info!("interrupted, stopping poller");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_sdk::ListerConfig;
    use mock_nova::{MockConfig, MockNova, ScriptedResponse, sample_servers};
    use serde_json::{Value, json};

    async fn setup(host: &str) -> (MockNova, Poller) {
        let mock = MockNova::new(
            MockConfig::default()
                .with_tenant_id("U1")
                .with_servers(sample_servers("U1")),
        );
        let endpoints = mock.spawn().await.expect("spawn mock");
        let config =
            ListerConfig::default().with_endpoints(&endpoints.auth_url, &endpoints.api_url);
        let lister = InstanceLister::new(config).expect("build lister");
        let poller = Poller::new(lister, HostId::new(host), Duration::from_secs(60));
        (mock, poller)
    }

    #[tokio::test]
    async fn poll_once_builds_snapshot() {
        let (_mock, poller) = setup("compute-01").await;
        let snapshot = poller.poll_once().await.expect("snapshot");
        assert_eq!(snapshot.host.as_str(), "compute-01");
        assert_eq!(snapshot.instance_count, 2);
    }

    #[tokio::test]
    async fn failed_poll_yields_no_snapshot() {
        let (mock, poller) = setup("compute-01").await;
        mock.push_list_response(ScriptedResponse::json(500, json!({})));
        assert!(poller.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn idle_host_still_yields_snapshot() {
        let (_mock, poller) = setup("compute-99").await;
        let snapshot = poller.poll_once().await.expect("snapshot");
        assert_eq!(snapshot.instance_count, 0);
    }

    #[tokio::test]
    async fn run_once_writes_single_line() {
        let (_mock, poller) = setup("compute-02").await;
        let mut out = Vec::new();
        poller.run(&mut out, true).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let value: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["host"], "compute-02");
        assert_eq!(value["instances"][0]["name"], "batch-01");
    }
}
