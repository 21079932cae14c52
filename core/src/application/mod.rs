//! Application layer - Use case services.
//!
//! This module contains the parse pipeline and the session that caches the
//! last capture around it.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod pipeline;
mod session;

pub use pipeline::{derive, Derivation};
pub use session::{Session, Snapshot};
