//! Keyword classification of log lines.
//!
//! Rules are evaluated in table order against a lowercase copy of the line
//! and the first match wins, so more specific rules must come first.

use crate::domain::EventType;

/// One row of the classification table.
///
/// A rule matches when the line contains every keyword in `all_of` and, if
/// `any_of` is non-empty, at least one keyword from it.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub event_type: EventType,
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
}

impl ClassificationRule {
    /// `normalized` must already be lowercase.
    pub fn matches(&self, normalized: &str) -> bool {
        self.all_of.iter().all(|keyword| normalized.contains(keyword))
            && (self.any_of.is_empty()
                || self.any_of.iter().any(|keyword| normalized.contains(keyword)))
    }
}

pub static CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        event_type: EventType::PeerConnected,
        all_of: &["peer connected"],
        any_of: &[],
    },
    ClassificationRule {
        event_type: EventType::PeerDisconnected,
        all_of: &["peer disconnected"],
        any_of: &[],
    },
    ClassificationRule {
        event_type: EventType::AuthSuccess,
        all_of: &["auth", "success"],
        any_of: &[],
    },
    ClassificationRule {
        event_type: EventType::AuthFailed,
        all_of: &["auth"],
        any_of: &["failed", "denied"],
    },
    ClassificationRule {
        event_type: EventType::SubnetRouteAdded,
        all_of: &["subnet"],
        any_of: &["route", "added"],
    },
    ClassificationRule {
        event_type: EventType::ExitNodeUsed,
        all_of: &["exit"],
        any_of: &["node", "used"],
    },
    ClassificationRule {
        event_type: EventType::UserLogin,
        all_of: &["login"],
        any_of: &[],
    },
    ClassificationRule {
        event_type: EventType::UserLogout,
        all_of: &["logout"],
        any_of: &[],
    },
    ClassificationRule {
        event_type: EventType::DnsQuery,
        all_of: &["dns"],
        any_of: &[],
    },
];

pub fn classify(line: &str) -> EventType {
    classify_normalized(&line.to_lowercase())
}

pub fn classify_normalized(normalized: &str) -> EventType {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matches(normalized))
        .map_or(EventType::DeviceUpdated, |rule| rule.event_type)
}
