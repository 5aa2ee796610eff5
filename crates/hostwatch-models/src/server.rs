//! Compute API server records.
//!
//! A [`ServerRecord`] is kept as the raw JSON object the compute API
//! returned. Nothing in the lister depends on its fields; the accessors
//! below exist for logging and for downstream consumers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute under which the compute API reports an instance's hypervisor.
pub const HOST_ATTRIBUTE: &str = "OS-EXT-SRV-ATTR:host";

/// One instance as returned by `servers/detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerRecord(Value);

impl ServerRecord {
    /// Wrap a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the record, returning the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The instance UUID, if present.
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// The display name, if present.
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// The lifecycle status (`ACTIVE`, `SHUTOFF`, …), if present.
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// The hypervisor host, if the caller may see extended attributes.
    pub fn host(&self) -> Option<&str> {
        self.str_field(HOST_ATTRIBUTE)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for ServerRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Body of a successful `servers/detail` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerList {
    pub servers: Vec<ServerRecord>,
}
