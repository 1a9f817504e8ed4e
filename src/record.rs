use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One synthetic document emitted by a worker.
///
/// Serialized with the beat field names (`@timestamp`, `type`), so a record
/// published as JSON looks like the events a real shipper would produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Bytes emitted by the producing generator before this record.
    pub offset: u64,
}

impl Record {
    pub fn new(kind: impl Into<String>, message: String, offset: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: kind.into(),
            message,
            offset,
        }
    }

    /// Byte length of the message payload
    pub fn len(&self) -> usize {
        self.message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Encode as a single JSON line (no trailing newline)
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
