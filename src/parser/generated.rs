// Include build-time validated regex patterns
include!(concat!(env!("OUT_DIR"), "/validated_regexes.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_index_constants() {
        assert_eq!(get_pattern_name(pattern_index::ISO_TIMESTAMP), Some("iso_timestamp"));
        assert_eq!(get_pattern_name(pattern_index::NODE_ID_FIELD), Some("node_id_field"));
        assert_eq!(get_pattern_name(pattern_index::USER_FIELD), Some("user_field"));
        assert_eq!(get_pattern_name(pattern_index::SRC_FIELD), Some("src_field"));
        assert_eq!(get_pattern_name(pattern_index::DST_FIELD), Some("dst_field"));
        assert_eq!(get_pattern_name(pattern_index::IPV4_TOKEN), Some("ipv4_token"));
        assert_eq!(get_pattern_name(pattern_index::IPV4_TOKEN + 1), None);
    }

    #[test]
    fn test_pattern_compilation() {
        for i in 0..=pattern_index::IPV4_TOKEN {
            assert!(
                VALIDATED_PATTERNS.get(i).is_ok(),
                "Pattern at index {i} should compile successfully"
            );
        }
    }
}
