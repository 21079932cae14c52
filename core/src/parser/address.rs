//! Decoding of the lsof `n` (socket name) field.

/// lsof's name for a socket with neither address nor port on either end.
pub const WILDCARD: &str = "*:*";

const REMOTE_SEPARATOR: &str = "->";

/// A decoded socket name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketName {
    /// The wildcard marker; such connections are never materialized.
    Wildcard,
    Endpoints {
        local: Endpoint,
        remote: Option<Endpoint>,
    },
}

/// An address and port as printed by lsof, kept as text.
///
/// Ports stay strings so values like `*` survive without conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub address: String,
    pub port: String,
}

impl Endpoint {
    /// Split `address:port` on the last colon.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    ///
    /// Text without a colon is taken as an address with no port.
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once(':') {
            Some((address, port)) => Self {
                address: address.to_string(),
                port: port.to_string(),
            },
            None => Self {
                address: text.to_string(),
                port: String::new(),
            },
        }
    }
}

impl SocketName {
    pub fn parse(text: &str) -> Self {
        if text == WILDCARD {
            return SocketName::Wildcard;
        }

        match text.split_once(REMOTE_SEPARATOR) {
            Some((local, remote)) => SocketName::Endpoints {
                local: Endpoint::parse(local),
                remote: Some(Endpoint::parse(remote)),
            },
            None => SocketName::Endpoints {
                local: Endpoint::parse(text),
                remote: None,
            },
        }
    }
}
