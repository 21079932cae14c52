//! Process terminator port (interface).

use crate::error::Result;

/// Port for terminating processes.
///
/// Implementations handle platform-specific signal delivery.
pub trait ProcessTerminator: Send + Sync {
    /// Request termination of a process.
    fn terminate(&self, pid: u32) -> impl std::future::Future<Output = Result<()>> + Send;
}
