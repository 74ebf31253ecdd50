//! Best-effort field extraction, independent of classification.

use super::generated::{VALIDATED_PATTERNS, pattern_index};
use super::regex_error::RegexError;

/// Fields pulled out of a single line. `None` means "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub timestamp: Option<String>,
    pub node_id: Option<String>,
    pub user: Option<String>,
    pub source_ip: Option<String>,
    pub dest_ip: Option<String>,
}

pub fn extract_fields(line: &str) -> Result<ExtractedFields, RegexError> {
    let timestamp = VALIDATED_PATTERNS
        .get(pattern_index::ISO_TIMESTAMP)?
        .find(line)
        .map(|m| m.as_str().to_string());
    let node_id = VALIDATED_PATTERNS.capture(pattern_index::NODE_ID_FIELD, line)?;
    let user = VALIDATED_PATTERNS.capture(pattern_index::USER_FIELD, line)?;
    let (source_ip, dest_ip) = extract_addresses(line)?;

    Ok(ExtractedFields {
        timestamp,
        node_id: node_id.map(str::to_string),
        user: user.map(str::to_string),
        source_ip,
        dest_ip,
    })
}

/// Keyed `src`/`dst` values win; whichever is missing is filled from the
/// bare IPv4 tokens of the line, in order, skipping keyed values.
fn extract_addresses(line: &str) -> Result<(Option<String>, Option<String>), RegexError> {
    let src_key = VALIDATED_PATTERNS.capture(pattern_index::SRC_FIELD, line)?;
    let dst_key = VALIDATED_PATTERNS.capture(pattern_index::DST_FIELD, line)?;

    if src_key.is_some() && dst_key.is_some() {
        return Ok((src_key.map(str::to_string), dst_key.map(str::to_string)));
    }

    let mut bare = VALIDATED_PATTERNS
        .get(pattern_index::IPV4_TOKEN)?
        .find_iter(line)
        .map(|m| m.as_str())
        .filter(|ip| Some(*ip) != src_key && Some(*ip) != dst_key);

    let source_ip = src_key.or_else(|| bare.next());
    let dest_ip = dst_key.or_else(|| bare.next());

    Ok((source_ip.map(str::to_string), dest_ip.map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_key_value_fields() {
        let fields = extract_fields(
            "2024-01-15T14:32:45 [INFO] tailscaled: peer connected: node_id=123, user=john@example.com",
        )
        .unwrap();

        assert_eq!(fields.timestamp.as_deref(), Some("2024-01-15T14:32:45"));
        assert_eq!(fields.node_id.as_deref(), Some("123"));
        assert_eq!(fields.user.as_deref(), Some("john@example.com"));
        assert_eq!(fields.source_ip, None);
        assert_eq!(fields.dest_ip, None);
    }

    #[test]
    fn test_timestamp_fraction_is_dropped() {
        let fields = extract_fields("2024-01-15T14:32:45.123Z [INFO] hello").unwrap();
        assert_eq!(fields.timestamp.as_deref(), Some("2024-01-15T14:32:45"));
    }

    #[test]
    fn test_colon_separator() {
        let fields = extract_fields("node_id:abc user:alice,rest").unwrap();
        assert_eq!(fields.node_id.as_deref(), Some("abc"));
        assert_eq!(fields.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_empty_value_does_not_borrow_next_token() {
        let fields = extract_fields("auth failed user= node_id=5 from 1.2.3.4").unwrap();
        assert_eq!(fields.user, None);
        assert_eq!(fields.node_id.as_deref(), Some("5"));

        let fields = extract_fields("flow src= 10.0.0.1 dst= 10.0.0.2").unwrap();
        assert_eq!(fields.source_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(fields.dest_ip.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_keyed_addresses() {
        let fields = extract_fields("flow src=100.64.0.1 dst=100.64.0.2 via 10.0.0.1").unwrap();
        assert_eq!(fields.source_ip.as_deref(), Some("100.64.0.1"));
        assert_eq!(fields.dest_ip.as_deref(), Some("100.64.0.2"));
    }

    #[test]
    fn test_bare_address_fallback_in_order() {
        let fields = extract_fields("relay 192.168.1.10 -> 192.168.1.20 and 8.8.8.8").unwrap();
        assert_eq!(fields.source_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(fields.dest_ip.as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn test_mixed_keyed_and_bare_addresses() {
        let fields = extract_fields("dst=10.0.0.2 seen from 10.0.0.9").unwrap();
        assert_eq!(fields.dest_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(fields.source_ip.as_deref(), Some("10.0.0.9"));

        let fields = extract_fields("src=10.0.0.1 only").unwrap();
        assert_eq!(fields.source_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(fields.dest_ip, None);
    }

    #[test]
    fn test_missing_fields() {
        let fields = extract_fields("nothing to see").unwrap();
        assert_eq!(fields, ExtractedFields::default());
    }
}
