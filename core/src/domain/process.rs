//! Process and connection domain models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Connection
// ============================================================================

/// One socket endpoint (or endpoint pair) held by a process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Transport reported by lsof (e.g. "TCP", "UDP").
    pub protocol: String,
    /// Connection state (e.g. "LISTEN"), empty when lsof reports none.
    pub status: String,
    pub local_address: String,
    pub local_port: String,
    /// Empty unless the capture expressed a local->remote pair.
    pub remote_address: String,
    /// Empty unless the capture expressed a local->remote pair.
    pub remote_port: String,
}

impl Connection {
    /// Create a connection bound to a local endpoint only.
    pub fn local(
        protocol: impl Into<String>,
        address: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            local_address: address.into(),
            local_port: port.into(),
            ..Self::default()
        }
    }

    /// Set the remote endpoint.
    pub fn with_remote(mut self, address: impl Into<String>, port: impl Into<String>) -> Self {
        self.remote_address = address.into();
        self.remote_port = port.into();
        self
    }

    /// Set the connection state.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Whether either endpoint uses the given port.
    pub fn uses_port(&self, port: &str) -> bool {
        self.local_port == port || self.remote_port == port
    }

    pub fn is_closed(&self) -> bool {
        self.status.eq_ignore_ascii_case("CLOSED")
    }

    pub fn is_listening(&self) -> bool {
        self.status.eq_ignore_ascii_case("LISTEN")
    }

    /// Remote address, or the local one when there is no remote endpoint.
    pub fn display_address(&self) -> &str {
        if self.remote_address.is_empty() {
            &self.local_address
        } else {
            &self.remote_address
        }
    }

    /// Remote port, or the local one when there is no remote endpoint.
    pub fn display_port(&self) -> &str {
        if self.remote_port.is_empty() {
            &self.local_port
        } else {
            &self.remote_port
        }
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.protocol, self.local_address, self.local_port)?;
        if !self.remote_address.is_empty() || !self.remote_port.is_empty() {
            write!(f, "->{}:{}", self.remote_address, self.remote_port)?;
        }
        if !self.status.is_empty() {
            write!(f, " ({})", self.status)?;
        }
        Ok(())
    }
}

// ============================================================================
// Process
// ============================================================================

/// A running program together with the connections it holds.
///
/// Connections keep the order in which they appeared in the capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: u32,
    /// Short executable name, not a path.
    pub name: String,
    /// Working directory; empty when not requested or not obtainable.
    pub directory: String,
    pub username: String,
    pub connections: Vec<Connection>,
}

impl Process {
    /// Create a process with no connections yet.
    pub fn new(id: u32, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            directory: String::new(),
            username: username.into(),
            connections: Vec::new(),
        }
    }

    /// Append a connection.
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (PID: {}, Owner: {}, {} connections)",
            self.name,
            self.id,
            self.username,
            self.connections.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_endpoint_prefers_remote() {
        let conn = Connection::local("TCP", "127.0.0.1", "443").with_remote("10.0.0.5", "51000");
        assert_eq!(conn.display_address(), "10.0.0.5");
        assert_eq!(conn.display_port(), "51000");

        let conn = Connection::local("TCP", "127.0.0.1", "80");
        assert_eq!(conn.display_address(), "127.0.0.1");
        assert_eq!(conn.display_port(), "80");
    }

    #[test]
    fn test_uses_port_either_endpoint() {
        let conn = Connection::local("TCP", "127.0.0.1", "3000").with_remote("10.0.0.1", "8080");
        assert!(conn.uses_port("3000"));
        assert!(conn.uses_port("8080"));
        assert!(!conn.uses_port("9090"));
    }

    #[test]
    fn test_connection_display() {
        let conn = Connection::local("TCP", "127.0.0.1", "443")
            .with_remote("10.0.0.5", "51000")
            .with_status("ESTABLISHED");
        assert_eq!(conn.to_string(), "TCP 127.0.0.1:443->10.0.0.5:51000 (ESTABLISHED)");
    }
}
