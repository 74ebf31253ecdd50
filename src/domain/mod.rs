//! Domain layer for tailscale-log-agent.
//!
//! Contains the canonical types shared across all modules:
//! - `Event`: The pipeline's core data type
//! - `EventType`: Classification of a log line
//! - `AgentError`: Top-level error type

pub mod error;
pub mod event;
pub mod event_type;

pub use error::AgentError;
pub use event::Event;
pub use event_type::EventType;
