//! Working directory lookup via procfs, falling back to lsof.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::parser::TaggedLine;
use crate::ports::DirectoryLookup;

/// Resolves a process's working directory.
///
/// Reads the `/proc/<pid>/cwd` link where procfs exists, otherwise asks
/// lsof for the `cwd` descriptor: `lsof -a -p PID -d cwd -Fn`.
///
/// The lsof fallback blocks the calling thread for one process spawn per
/// PID. `Session` caches lookups per snapshot so this cost is paid once per
/// capture, not on every re-derive.
#[derive(Debug, Clone)]
pub struct ProcDirectoryLookup {
    proc_root: PathBuf,
    lsof: PathBuf,
}

impl ProcDirectoryLookup {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            lsof: PathBuf::from("lsof"),
        }
    }

    fn from_procfs(&self, pid: u32) -> Option<String> {
        let link = self.proc_root.join(pid.to_string()).join("cwd");
        match std::fs::read_link(&link) {
            Ok(path) => Some(path.to_string_lossy().into_owned()),
            Err(e) => {
                debug!(pid = pid, error = %e, "Could not read cwd link");
                None
            }
        }
    }

    fn from_lsof(&self, pid: u32) -> Option<String> {
        let output = Command::new(&self.lsof)
            .args(["-a", "-p", &pid.to_string(), "-d", "cwd", "-Fn"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| debug!(pid = pid, error = %e, "Failed to run lsof for cwd"))
            .ok()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.lines().find_map(|line| match TaggedLine::decode(line) {
            TaggedLine::Address(path) if !path.is_empty() => Some(path.to_string()),
            _ => None,
        })
    }
}

impl Default for ProcDirectoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryLookup for ProcDirectoryLookup {
    fn directory(&self, pid: u32) -> Option<String> {
        if self.proc_root.is_dir() {
            self.from_procfs(pid)
        } else {
            self.from_lsof(pid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_own_working_directory() {
        let lookup = ProcDirectoryLookup::new();
        let expected = std::env::current_dir().unwrap();
        assert_eq!(
            lookup.directory(std::process::id()),
            Some(expected.to_string_lossy().into_owned())
        );
    }

    #[test]
    fn test_missing_process_has_no_directory() {
        let lookup = ProcDirectoryLookup::new();
        assert_eq!(lookup.directory(i32::MAX as u32), None);
    }

    #[test]
    fn test_procfs_root_is_configurable() {
        let root = tempfile::tempdir().unwrap();
        let pid_dir = root.path().join("42");
        std::fs::create_dir(&pid_dir).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink("/srv/app", pid_dir.join("cwd")).unwrap();

        let lookup = ProcDirectoryLookup {
            proc_root: root.path().to_path_buf(),
            lsof: PathBuf::from("/nonexistent/lsof"),
        };
        #[cfg(unix)]
        assert_eq!(lookup.directory(42), Some("/srv/app".to_string()));
        assert_eq!(lookup.directory(43), None);
    }
}
