//! The line-oriented record handed to the telemetry pipeline.

use chrono::{DateTime, Utc};
use hostwatch_models::{HostId, ServerRecord};
use serde::Serialize;

/// One successful poll of a host.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSnapshot {
    pub host: HostId,
    pub polled_at: DateTime<Utc>,
    pub instance_count: usize,
    pub instances: Vec<ServerRecord>,
}

impl InstanceSnapshot {
    pub fn new(host: HostId, polled_at: DateTime<Utc>, instances: Vec<ServerRecord>) -> Self {
        Self {
            host,
            polled_at,
            instance_count: instances.len(),
            instances,
        }
    }

    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    #[test]
    fn snapshot_line_shape() {
        let polled_at = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let snapshot = InstanceSnapshot::new(
            HostId::new("compute-01"),
            polled_at,
            vec![ServerRecord::new(json!({"id": "i-1"}))],
        );

        let line = snapshot.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            value,
            json!({
                "host": "compute-01",
                "polled_at": "2026-10-18T12:00:00Z",
                "instance_count": 1,
                "instances": [{"id": "i-1"}]
            })
        );
    }
}
