//! File collection: following a single growing log file.

pub mod tail;

pub use tail::{TailCursor, TailError};
