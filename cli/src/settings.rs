//! Command-line view options and their merge with the config file.

use clap::Args;
use pvw_core::{Column, ColumnOptions, Config, FilterSettings};

/// Column switches.
#[derive(Args, Debug, Clone, Default)]
pub struct ColumnArgs {
    /// Show the protocol used in a connection
    #[arg(short = 'P', long)]
    show_protocol: bool,

    /// Show IP addresses in a connection
    #[arg(short = 'a', long)]
    show_addresses: bool,

    /// Show full connection information (local and remote endpoints)
    #[arg(short = 'C', long)]
    show_full_connection: bool,

    /// Show the owner of processes
    #[arg(short = 'o', long)]
    show_owner: bool,

    /// Show the name of processes
    #[arg(short = 'n', long)]
    show_process_name: bool,

    /// Show the working directory of processes
    #[arg(short = 'd', long)]
    show_cwd: bool,

    /// Show all information (equivalent to -PCond)
    #[arg(short = 'A', long)]
    show_all: bool,

    /// Hide the process ID column
    #[arg(long)]
    no_pid: bool,

    /// Hide the connection status column
    #[arg(long)]
    no_status: bool,
}

impl ColumnArgs {
    pub fn options(&self) -> ColumnOptions {
        ColumnOptions {
            pid: !self.no_pid,
            name: self.show_process_name,
            directory: self.show_cwd,
            owner: self.show_owner,
            protocol: self.show_protocol,
            addresses: self.show_addresses,
            full_connection: self.show_full_connection,
            status: !self.no_status,
            all: self.show_all,
        }
    }
}

/// Filtering and column options.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Only show processes with these exact names
    #[arg(value_name = "NAME")]
    names: Vec<String>,

    #[command(flatten)]
    columns: ColumnArgs,

    /// Only show listening ports
    #[arg(short, long)]
    listen_only: bool,

    /// Show closed ports
    #[arg(short = 'c', long)]
    show_closed: bool,

    /// Only show these ports (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "PORT")]
    ports: Vec<String>,

    /// Read-only mode - prevents processes from being terminated
    #[arg(short, long)]
    read_only: bool,
}

/// Effective settings after merging flags with the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub settings: FilterSettings,
    pub read_only: bool,
}

impl ViewArgs {
    /// Merge with the stored configuration.
    ///
    /// Boolean flags can only switch options on. Explicit ports and column
    /// flags replace the configured ones.
    pub fn resolve(&self, config: &Config) -> View {
        let mut settings = config.to_settings().with_names(self.names.iter().cloned());
        settings.show_closed |= self.show_closed;
        settings.listen_only |= self.listen_only;

        if !self.ports.is_empty() {
            settings.port_filter = self.ports.iter().map(|p| p.trim().to_string()).collect();
        }

        let options = self.columns.options();
        if options.is_customized() || config.columns.is_none() {
            settings = settings.with_columns(options.resolve());
        }
        let get_directory = settings.columns.contains(&Column::Directory);

        View {
            settings: settings.with_directory(get_directory),
            read_only: self.read_only || config.read_only,
        }
    }
}
