//! Line parser: raw tailscaled log line -> [`Event`](crate::domain::Event).
//!
//! Classification and field extraction are independent. Classification is an
//! ordered keyword table ([`classify`]); extraction uses the regex patterns
//! validated by `build.rs` ([`fields`]). Neither ever fails the pipeline: a
//! line that cannot be parsed is logged and dropped.

pub mod classify;
pub mod fields;
pub mod generated;
pub mod line;
pub mod regex_error;
pub mod regex_patterns;

pub use classify::{CLASSIFICATION_RULES, ClassificationRule, classify};
pub use fields::{ExtractedFields, extract_fields};
pub use line::{LineParser, ParseError, parse};
pub use regex_error::RegexError;
