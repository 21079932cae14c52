//! Projection of filtered processes onto display rows.

use serde::Serialize;

use crate::domain::{Column, Connection, Process};

/// One display row, positionally aligned with the configured columns.
pub type Row = Vec<String>;

/// Rows for every surviving connection plus the index of each process's
/// first row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRows {
    pub rows: Vec<Row>,
    /// `row_starts[i]` is the first row of the i-th process.
    pub row_starts: Vec<usize>,
}

impl TableRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the process owning `row`.
    pub fn process_index_for_row(&self, row: usize) -> Option<usize> {
        if row >= self.rows.len() {
            return None;
        }
        // row_starts is strictly increasing and starts at 0
        self.row_starts
            .partition_point(|&start| start <= row)
            .checked_sub(1)
    }

    /// The process owning `row`, given the processes these rows came from.
    pub fn process_for_row<'a>(&self, processes: &'a [Process], row: usize) -> Option<&'a Process> {
        self.process_index_for_row(row)
            .and_then(|index| processes.get(index))
    }
}

/// Build one row per connection, in process-then-connection order.
pub fn project(processes: &[Process], columns: &[Column]) -> TableRows {
    let mut table = TableRows::default();

    for process in processes {
        table.row_starts.push(table.rows.len());

        for (index, connection) in process.connections.iter().enumerate() {
            let first = index == 0;
            let row = columns
                .iter()
                .map(|column| cell(process, connection, *column, first))
                .collect();
            table.rows.push(row);
        }
    }

    table
}

/// Render a single cell. Process-scoped columns are blank after the first
/// row of a process.
fn cell(process: &Process, connection: &Connection, column: Column, first: bool) -> String {
    if column.is_process_scoped() && !first {
        return String::new();
    }

    match column {
        Column::Pid => process.id.to_string(),
        Column::Name => process.name.clone(),
        Column::Directory => process.directory.clone(),
        Column::Owner => process.username.clone(),
        Column::Protocol => connection.protocol.clone(),
        Column::Address => connection.display_address().to_string(),
        Column::Port => connection.display_port().to_string(),
        Column::LocalAddress => connection.local_address.clone(),
        Column::LocalPort => connection.local_port.clone(),
        Column::RemoteAddress => connection.remote_address.clone(),
        Column::RemotePort => connection.remote_port.clone(),
        Column::Status => connection.status.to_uppercase(),
    }
}
