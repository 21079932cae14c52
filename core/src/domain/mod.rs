//! Domain layer - Pure data models and filtering rules.
//!
//! This module contains the process/connection model decoded from a capture,
//! the filter settings applied to it and the display columns it projects onto.
//! These types have no I/O dependencies and can be tested in isolation.

mod column;
mod filter;
mod process;

// Re-export all domain types
pub use column::{Column, ColumnOptions};
pub use filter::FilterSettings;
pub use process::{Connection, Process};
