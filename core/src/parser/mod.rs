//! Decoding of `lsof -F` field output into processes and connections.
//!
//! Parsing is all-or-nothing: any malformed record fails the whole capture.

mod address;
mod line;
mod splitter;

pub use address::{Endpoint, SocketName, WILDCARD};
pub use line::TaggedLine;
pub use splitter::{split_records, Record, CONNECTION_SENTINEL, PROCESS_SENTINEL};

use tracing::debug;

use crate::domain::{Connection, Process};
use crate::error::{Error, Result};

/// Parse a raw capture into one process per record, in capture order.
///
/// Connections named by the wildcard marker, or carrying no name at all, are
/// dropped here, so a returned process may have no connections.
pub fn parse_capture(raw: &str) -> Result<Vec<Process>> {
    split_records(raw)?.iter().map(interpret_record).collect()
}

/// Decode the header and connections of a single record.
pub fn interpret_record(record: &Record<'_>) -> Result<Process> {
    let id: u32 = record.identifier.parse().map_err(|e| {
        Error::ParseError(format!(
            "invalid process identifier {:?}: {}",
            record.identifier, e
        ))
    })?;

    let mut name = "";
    let mut owner = "";
    for line in &record.header {
        match TaggedLine::decode(line) {
            TaggedLine::Command(value) => name = value,
            TaggedLine::Owner(value) => owner = value,
            _ => {}
        }
    }

    let mut process = Process::new(id, name, owner);
    for chunk in &record.connections {
        match interpret_connection(chunk) {
            Some(connection) => process.connections.push(connection),
            None => debug!(pid = id, "Skipping connection without a concrete endpoint"),
        }
    }

    Ok(process)
}

/// Decode one file set. Returns `None` for wildcard or unnamed sockets.
pub fn interpret_connection(chunk: &str) -> Option<Connection> {
    let mut connection = Connection::default();
    let mut named = false;

    // The first line is the file descriptor, which is not displayed
    for line in chunk.lines().skip(1) {
        match TaggedLine::decode(line) {
            TaggedLine::Protocol(value) => connection.protocol = value.to_string(),
            TaggedLine::State(value) => connection.status = value.to_string(),
            TaggedLine::Address(value) => match SocketName::parse(value) {
                SocketName::Wildcard => return None,
                SocketName::Endpoints { local, remote } => {
                    connection.local_address = local.address;
                    connection.local_port = local.port;
                    if let Some(remote) = remote {
                        connection.remote_address = remote.address;
                        connection.remote_port = remote.port;
                    }
                    named = true;
                }
            },
            _ => {}
        }
    }

    named.then_some(connection)
}
