use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single log line.
///
/// Serialized in snake_case (`peer_connected`, ...), which is the form the
/// collector stores and filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PeerConnected,
    PeerDisconnected,
    AuthSuccess,
    AuthFailed,
    SubnetRouteAdded,
    ExitNodeUsed,
    UserLogin,
    UserLogout,
    DnsQuery,
    /// Catch-all when no rule matches.
    #[default]
    DeviceUpdated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PeerConnected => "peer_connected",
            EventType::PeerDisconnected => "peer_disconnected",
            EventType::AuthSuccess => "auth_success",
            EventType::AuthFailed => "auth_failed",
            EventType::SubnetRouteAdded => "subnet_route_added",
            EventType::ExitNodeUsed => "exit_node_used",
            EventType::UserLogin => "user_login",
            EventType::UserLogout => "user_logout",
            EventType::DnsQuery => "dns_query",
            EventType::DeviceUpdated => "device_updated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
