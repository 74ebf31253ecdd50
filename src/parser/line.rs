use super::classify::classify_normalized;
use super::fields::extract_fields;
use super::regex_error::RegexError;
use crate::domain::event::UNKNOWN;
use crate::domain::Event;
use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Field extraction failed: {0}")]
    Extraction(#[from] RegexError),
}

/// Turns raw tailscaled log lines into [`Event`]s.
///
/// The parser itself is stateless apart from the origin tag it stamps on
/// every event; one instance is shared by the whole agent loop.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    origin_tag: Option<String>,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin_tag(origin_tag: Option<String>) -> Self {
        Self { origin_tag }
    }

    /// Parse a line, logging and discarding it on failure.
    pub fn parse(&self, line: &str) -> Option<Event> {
        match self.parse_line(line) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, line = %trim_line_ending(line), "Dropping unparseable log line");
                None
            }
        }
    }

    pub fn parse_line(&self, line: &str) -> Result<Event, ParseError> {
        let raw_text = trim_line_ending(line);

        let event_type = classify_normalized(&raw_text.to_lowercase());
        let fields = extract_fields(raw_text)?;

        Ok(Event {
            timestamp: fields.timestamp.unwrap_or_else(now_iso8601),
            event_type,
            node_id: fields.node_id.unwrap_or_else(|| UNKNOWN.to_string()),
            user: fields.user.unwrap_or_else(|| UNKNOWN.to_string()),
            source_ip: fields.source_ip,
            dest_ip: fields.dest_ip,
            raw_text: raw_text.to_string(),
            origin_tag: self.origin_tag.clone(),
        })
    }
}

/// Parse with no origin tag.
pub fn parse(line: &str) -> Option<Event> {
    LineParser::new().parse(line)
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
