//! The capture-to-rows pipeline.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{FilterSettings, Process};
use crate::error::Result;
use crate::parser::parse_capture;
use crate::ports::DirectoryLookup;
use crate::projection::{project, TableRows};

/// Everything derived from one capture under one set of settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivation {
    /// Snapshot the rows were derived from, when derived through a session.
    pub snapshot_id: Option<Uuid>,
    /// Processes with at least one surviving connection.
    pub processes: Vec<Process>,
    pub table: TableRows,
}

impl Derivation {
    /// The process owning a table row.
    pub fn process_for_row(&self, row: usize) -> Option<&Process> {
        self.table.process_for_row(&self.processes, row)
    }

    pub fn connection_count(&self) -> usize {
        self.table.len()
    }
}

/// Parse, filter and project a raw capture.
///
/// Runs to completion or fails as a whole; no partial rows are returned.
/// Directory lookup, when enabled, runs once per surviving process.
pub fn derive<D>(raw: &str, settings: &FilterSettings, directories: &D) -> Result<Derivation>
where
    D: DirectoryLookup + ?Sized,
{
    let parsed = parse_capture(raw)?;
    let parsed_count = parsed.len();

    let mut processes = settings.apply(parsed);
    if settings.get_directory {
        for process in &mut processes {
            process.directory = directories.directory(process.id).unwrap_or_default();
        }
    }

    let table = project(&processes, &settings.columns);
    debug!(
        parsed = parsed_count,
        kept = processes.len(),
        rows = table.len(),
        "Derived rows from capture"
    );

    Ok(Derivation {
        snapshot_id: None,
        processes,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NGINX: &str = "p1234\ncnginx\nLroot\nf6\nPTCP\nn127.0.0.1:80\nTST=LISTEN\nTQR=0\nTQS=0\nf7\nPTCP\nn127.0.0.1:443->10.0.0.5:51000\nTST=ESTABLISHED\nTQR=0\nTQS=0\n";

    fn no_directory(_pid: u32) -> Option<String> {
        None
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::Pid,
            Column::Name,
            Column::Address,
            Column::Port,
            Column::Status,
        ]
    }

    #[test]
    fn test_nginx_scenario_no_filters() {
        let settings = FilterSettings::new().with_columns(columns());
        let result = derive(NGINX, &settings, &no_directory).unwrap();

        assert_eq!(
            result.table.rows,
            vec![
                vec!["1234", "nginx", "127.0.0.1", "80", "LISTEN"],
                vec!["", "", "10.0.0.5", "51000", "ESTABLISHED"],
            ]
        );
        assert_eq!(result.table.row_starts, vec![0]);
        assert_eq!(result.process_for_row(1).map(|p| p.id), Some(1234));
    }

    #[test]
    fn test_nginx_scenario_listen_only() {
        let settings = FilterSettings::new()
            .with_columns(columns())
            .with_listen_only(true);
        let result = derive(NGINX, &settings, &no_directory).unwrap();

        assert_eq!(result.processes.len(), 1);
        assert_eq!(
            result.table.rows,
            vec![vec!["1234", "nginx", "127.0.0.1", "80", "LISTEN"]]
        );
    }

    #[test]
    fn test_wildcard_only_process_is_absent() {
        let raw = format!("{}p77\ncmDNSResponder\nL_mdnsresponder\nf3\nPUDP\nn*:*\n", NGINX);
        let settings = FilterSettings::new().with_columns(columns());
        let result = derive(&raw, &settings, &no_directory).unwrap();

        assert_eq!(result.processes.len(), 1);
        assert!(result.processes.iter().all(|p| p.id != 77));
        assert!(result.table.rows.iter().all(|row| row[0] != "77"));
    }

    #[test]
    fn test_rows_per_process_match_surviving_connections() {
        let raw = format!(
            "{}p2\ncnode\nLdev\nf20\nPTCP\nn*:3000\nTST=LISTEN\nf21\nPTCP\nn127.0.0.1:3000->127.0.0.1:60000\nTST=CLOSED\n",
            NGINX
        );
        let settings = FilterSettings::new().with_columns([Column::Pid]);
        let result = derive(&raw, &settings, &no_directory).unwrap();

        // The CLOSED connection of node is dropped
        assert_eq!(result.table.row_starts, vec![0, 2]);
        assert_eq!(result.table.len(), 3);
        assert_eq!(result.table.rows[2], vec!["2"]);
    }

    #[test]
    fn test_directory_lookup_once_per_surviving_process() {
        let calls = AtomicUsize::new(0);
        let lookup = |pid: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            (pid == 1234).then(|| "/srv/www".to_string())
        };

        let raw = format!("{}p5\ncsshd\nLroot\nf3\nPTCP\nn*:22\nTST=LISTEN\np6\ncgone\nLroot\nf3\nPUDP\nn*:*\n", NGINX);
        let settings = FilterSettings::new().with_columns([Column::Pid, Column::Directory]);
        let result = derive(&raw, &settings, &lookup).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.table.rows[0], vec!["1234", "/srv/www"]);
        assert_eq!(result.table.rows[2], vec!["5", ""]);
    }

    #[test]
    fn test_directory_lookup_skipped_when_not_requested() {
        let lookup = |_pid: u32| -> Option<String> { panic!("lookup should not run") };
        let settings = FilterSettings::new().with_columns(columns());
        assert!(derive(NGINX, &settings, &lookup).is_ok());
    }

    #[test]
    fn test_parse_failure_yields_no_rows() {
        let raw = format!("{}pnot-a-pid\ncx\nLy\n", NGINX);
        let err = derive(&raw, &FilterSettings::new(), &no_directory).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_rederive_is_idempotent() {
        let settings = FilterSettings::new()
            .with_columns(Column::ALL)
            .with_directory(false);
        let first = derive(NGINX, &settings, &no_directory).unwrap();
        let second = derive(NGINX, &settings, &no_directory).unwrap();
        assert_eq!(first, second);
    }
}
