//! Non-interactive commands.

pub mod list;
