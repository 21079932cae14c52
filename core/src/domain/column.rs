//! Display columns and their selection from command-line style options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Column
// ============================================================================

/// A display column of the process table.
///
/// Process-scoped columns (PID, name, directory, owner) only render on the
/// first row of each process; the rest render per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Column {
    Pid,
    Name,
    Directory,
    Owner,
    Protocol,
    /// Remote address, falling back to the local one.
    Address,
    /// Remote port, falling back to the local one.
    Port,
    LocalAddress,
    LocalPort,
    RemoteAddress,
    RemotePort,
    Status,
}

impl Column {
    /// All columns in canonical display order.
    pub const ALL: [Column; 12] = [
        Column::Pid,
        Column::Name,
        Column::Directory,
        Column::Owner,
        Column::Protocol,
        Column::Address,
        Column::Port,
        Column::LocalAddress,
        Column::LocalPort,
        Column::RemoteAddress,
        Column::RemotePort,
        Column::Status,
    ];

    /// Header title of this column.
    pub fn title(&self) -> &'static str {
        match self {
            Column::Pid => "PID",
            Column::Name => "Name",
            Column::Directory => "Directory",
            Column::Owner => "Owner",
            Column::Protocol => "Protocol",
            Column::Address => "Address",
            Column::Port => "Port",
            Column::LocalAddress => "Local Address",
            Column::LocalPort => "Local Port",
            Column::RemoteAddress => "Remote Address",
            Column::RemotePort => "Remote Port",
            Column::Status => "Status",
        }
    }

    /// Preferred width in terminal cells.
    pub fn width(&self) -> u16 {
        match self {
            Column::Pid => 5,
            Column::Name => 10,
            Column::Directory => 16,
            Column::Owner => 8,
            Column::Protocol => 3,
            Column::Address | Column::LocalAddress | Column::RemoteAddress => 15,
            Column::Port | Column::LocalPort | Column::RemotePort => 5,
            Column::Status => 11,
        }
    }

    /// Whether the column describes the process rather than a connection.
    pub fn is_process_scoped(&self) -> bool {
        matches!(
            self,
            Column::Pid | Column::Name | Column::Directory | Column::Owner
        )
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Column {
    type Err = Error;

    /// Parse a column title, ignoring case and `-`/`_`/space separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        Column::ALL
            .into_iter()
            .find(|column| column.title().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| Error::Config(format!("Unknown column: {}", s)))
    }
}

impl TryFrom<String> for Column {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.title().to_string()
    }
}

// ============================================================================
// ColumnOptions
// ============================================================================

/// Column switches as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOptions {
    pub pid: bool,
    pub name: bool,
    pub directory: bool,
    pub owner: bool,
    pub protocol: bool,
    pub addresses: bool,
    /// Replace Address/Port with the four local/remote columns.
    pub full_connection: bool,
    pub status: bool,
    /// Shorthand for PID, name, directory, owner, protocol, full connection and status.
    pub all: bool,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            pid: true,
            name: false,
            directory: false,
            owner: false,
            protocol: false,
            addresses: false,
            full_connection: false,
            status: true,
            all: false,
        }
    }
}

impl ColumnOptions {
    /// Whether the options differ from the default selection.
    pub fn is_customized(&self) -> bool {
        *self != Self::default()
    }

    /// Resolve the options into the ordered list of enabled columns.
    pub fn resolve(&self) -> Vec<Column> {
        let mut opts = *self;
        if opts.all {
            opts.pid = true;
            opts.name = true;
            opts.directory = true;
            opts.owner = true;
            opts.protocol = true;
            opts.full_connection = true;
            opts.status = true;
        }

        Column::ALL
            .into_iter()
            .filter(|column| match column {
                Column::Pid => opts.pid,
                Column::Name => opts.name,
                Column::Directory => opts.directory,
                Column::Owner => opts.owner,
                Column::Protocol => opts.protocol,
                Column::Address => opts.addresses && !opts.full_connection,
                Column::Port => !opts.full_connection,
                Column::LocalAddress
                | Column::LocalPort
                | Column::RemoteAddress
                | Column::RemotePort => opts.full_connection,
                Column::Status => opts.status,
            })
            .collect()
    }
}
