use super::event_type::EventType;
use serde::{Deserialize, Serialize};

/// Sentinel used for identifiers that could not be extracted from a line.
pub const UNKNOWN: &str = "unknown";

/// A structured event extracted from one log line.
///
/// This is the canonical representation throughout the pipeline, from parser
/// output through batching to the collector payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub event_type: EventType,
    pub node_id: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<String>,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_tag: Option<String>,
}

impl Event {
    /// Rough in-memory footprint, reported while a batch is retained.
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Event>()
            + self.timestamp.len()
            + self.node_id.len()
            + self.user.len()
            + self.raw_text.len()
            + self.source_ip.as_ref().map_or(0, String::len)
            + self.dest_ip.as_ref().map_or(0, String::len)
            + self.origin_tag.as_ref().map_or(0, String::len)
    }
}
