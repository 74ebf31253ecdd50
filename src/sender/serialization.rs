use crate::domain::{Event, EventType};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Batch is empty")]
    EmptyBatch,
}

/// Field naming used in the collector payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireSchema {
    /// `timestamp`, `event_type`, `source_ip`, ... (default)
    #[default]
    Canonical,
    /// `ts`, `type`, `src`, `dst`, `event`, `raw`, `source`, as read by the
    /// collector's `/api/tailscale/agent` route
    Legacy,
}

#[derive(Serialize)]
struct LegacyRecord<'a> {
    ts: &'a str,
    #[serde(rename = "type")]
    event_type: EventType,
    node_id: &'a str,
    user: &'a str,
    src: Option<&'a str>,
    dst: Option<&'a str>,
    event: &'a str,
    raw: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

impl<'a> From<&'a Event> for LegacyRecord<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            ts: &event.timestamp,
            event_type: event.event_type,
            node_id: &event.node_id,
            user: &event.user,
            src: event.source_ip.as_deref(),
            dst: event.dest_ip.as_deref(),
            event: event.raw_text.trim(),
            raw: &event.raw_text,
            source: event.origin_tag.as_deref(),
        }
    }
}

/// Serializes a batch as one JSON array.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSerializer {
    schema: WireSchema,
}

impl BatchSerializer {
    pub fn new(schema: WireSchema) -> Self {
        Self { schema }
    }

    pub fn serialize(&self, events: &[Event]) -> Result<Vec<u8>, SerializationError> {
        if events.is_empty() {
            return Err(SerializationError::EmptyBatch);
        }

        let payload = match self.schema {
            WireSchema::Canonical => serde_json::to_vec(events)?,
            WireSchema::Legacy => {
                let records: Vec<LegacyRecord<'_>> = events.iter().map(LegacyRecord::from).collect();
                serde_json::to_vec(&records)?
            }
        };
        Ok(payload)
    }
}
