//! Filter settings and the process/connection predicates built on them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Column, ColumnOptions, Connection, Process};

/// Parsing, filtering and rendering settings for one snapshot.
///
/// Built once at startup; afterwards only the search term changes as the
/// user types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    /// Exact process names to allow. Empty allows every name.
    #[serde(default)]
    pub name_filter: BTreeSet<String>,
    /// Ports to allow, matched against either endpoint. Empty allows every port.
    #[serde(default)]
    pub port_filter: BTreeSet<String>,
    /// Substring the process name must contain.
    #[serde(default)]
    pub search_term: String,
    /// Keep connections in the CLOSED state.
    #[serde(default)]
    pub show_closed: bool,
    /// Keep only connections in the LISTEN state.
    #[serde(default)]
    pub listen_only: bool,
    /// Ordered display columns.
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,
    /// Look up the working directory of each surviving process.
    #[serde(default)]
    pub get_directory: bool,
}

fn default_columns() -> Vec<Column> {
    ColumnOptions::default().resolve()
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            name_filter: BTreeSet::new(),
            port_filter: BTreeSet::new(),
            search_term: String::new(),
            show_closed: false,
            listen_only: false,
            columns: default_columns(),
            get_directory: false,
        }
    }
}

impl FilterSettings {
    /// Create settings with no filtering and the default columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-level predicate, evaluated on the command name.
    ///
    /// An empty name filter and an empty search term each pass everything on
    /// their own, but a name filter without a search term still requires
    /// membership.
    pub fn matches_process(&self, name: &str) -> bool {
        let no_filter = self.name_filter.is_empty();
        let no_search = self.search_term.is_empty();
        let listed = self.name_filter.contains(name);
        let found = name.contains(self.search_term.as_str());

        (no_filter && no_search)
            || (no_search && listed)
            || (no_filter && found)
            || (!no_filter && !no_search && found && listed)
    }

    /// Connection-level predicate.
    ///
    /// Wildcard and endpoint-less connections never reach this point; the
    /// parser does not materialize them.
    pub fn matches_connection(&self, connection: &Connection) -> bool {
        if !self.port_filter.is_empty()
            && !self.port_filter.iter().any(|port| connection.uses_port(port))
        {
            return false;
        }
        if !self.show_closed && connection.is_closed() {
            return false;
        }
        if self.listen_only && !connection.is_listening() {
            return false;
        }
        true
    }

    /// Filter parsed processes, dropping any left without connections.
    pub fn apply(&self, processes: Vec<Process>) -> Vec<Process> {
        processes
            .into_iter()
            .filter(|process| self.matches_process(&process.name))
            .filter_map(|mut process| {
                process
                    .connections
                    .retain(|connection| self.matches_connection(connection));
                (!process.connections.is_empty()).then_some(process)
            })
            .collect()
    }

    /// Set the allowed process names.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_filter = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the allowed ports.
    pub fn with_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.port_filter = ports.into_iter().map(Into::into).collect();
        self
    }

    /// Set the search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Enable/disable CLOSED connections.
    pub fn with_show_closed(mut self, enabled: bool) -> Self {
        self.show_closed = enabled;
        self
    }

    /// Enable/disable listen-only mode.
    pub fn with_listen_only(mut self, enabled: bool) -> Self {
        self.listen_only = enabled;
        self
    }

    /// Set the display columns. Selecting the directory column enables
    /// directory lookup.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns = columns.into_iter().collect();
        if self.columns.contains(&Column::Directory) {
            self.get_directory = true;
        }
        self
    }

    /// Enable/disable working directory lookup.
    pub fn with_directory(mut self, enabled: bool) -> Self {
        self.get_directory = enabled;
        self
    }
}
