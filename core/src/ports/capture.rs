//! Capture source port (interface).

use crate::error::Result;

/// Port for obtaining raw process enumeration text.
///
/// Implementations return the text in the field grammar produced by
/// `lsof -i -P -n -F pcLfPnT`. "No processes found" is a successful empty
/// string, not an error.
pub trait CaptureSource: Send + Sync {
    /// Run one capture.
    fn capture(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}
