//! pvw Core Library
//!
//! Turns the field output of `lsof` into filtered, display-ready rows.
//! Provides functionality to:
//! - Split and decode `lsof -F` captures into processes and connections
//! - Filter processes by name, search term, port and connection state
//! - Project the result onto configurable table columns
//! - Cache the last capture so filter changes re-derive without re-running lsof
//! - Terminate a process and capture again
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models and filtering rules
//! - `parser` / `projection`: Pure text-in, rows-out transformations
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: The pipeline and the snapshot session
//!
//! # Platform Support
//! UNIX only: captures with `lsof`, terminates with `kill(2)`, resolves
//! working directories from procfs or `lsof`.

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;
pub mod parser;
pub mod projection;

// Re-export domain types (primary API)
pub use domain::{Column, ColumnOptions, Connection, FilterSettings, Process};

// Re-export other commonly used types
pub use adapters::{LsofCapture, ProcDirectoryLookup, SignalTerminator};
pub use application::{derive, Derivation, Session, Snapshot};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use parser::parse_capture;
pub use ports::{CaptureSource, DirectoryLookup, ProcessTerminator};
pub use projection::{project, Row, TableRows};

/// The session type used by the binary.
pub type SystemSession = Session<LsofCapture, SignalTerminator, ProcDirectoryLookup>;

impl SystemSession {
    /// Create a session backed by lsof, SIGTERM and procfs.
    pub fn system(settings: FilterSettings) -> Self {
        Session::new(
            LsofCapture::new(),
            SignalTerminator::new(),
            ProcDirectoryLookup::new(),
            settings,
        )
    }
}
