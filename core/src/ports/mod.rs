//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces the application layer uses to reach
//! the collaborators around the parse pipeline. Implementations live in
//! `adapters`.

mod capture;
mod directory;
mod terminator;

pub use capture::CaptureSource;
pub use directory::DirectoryLookup;
pub use terminator::ProcessTerminator;
