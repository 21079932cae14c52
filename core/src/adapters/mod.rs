//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external commands or the kernel.

mod directory;
mod lsof;
mod signal;

// Re-export main types for convenience
pub use directory::ProcDirectoryLookup;
pub use lsof::LsofCapture;
pub use signal::SignalTerminator;
