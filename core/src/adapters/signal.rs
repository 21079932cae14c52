//! Termination adapter delivering signals with `kill(2)`.

use crate::error::{Error, Result};
use crate::ports::ProcessTerminator;

/// Sends SIGTERM to a process, as `kill PID` does.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, pid: u32) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        use tracing::{debug, warn};

        // PID 0 and values beyond i32 would address process groups
        let raw = i32::try_from(pid)
            .ok()
            .filter(|raw| *raw > 0)
            .ok_or_else(|| Error::KillFailed {
                pid,
                reason: "not a valid process id".to_string(),
            })?;

        debug!(pid = pid, "Sending SIGTERM to process");

        match kill(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid = pid, "Signal sent successfully");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found");
                Err(Error::ProcessNotFound(pid))
            }
            Err(Errno::EPERM) => {
                warn!(pid = pid, "Permission denied to kill process");
                Err(Error::PermissionDenied(format!(
                    "not allowed to terminate process {}",
                    pid
                )))
            }
            Err(errno) => Err(Error::KillFailed {
                pid,
                reason: errno.desc().to_string(),
            }),
        }
    }
}

#[cfg(not(unix))]
impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, _pid: u32) -> Result<()> {
        Err(Error::UnsupportedPlatform(
            "process termination requires a UNIX signal interface".to_string(),
        ))
    }
}
