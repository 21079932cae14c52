//! Capture adapter running `lsof` in field output mode.

use std::path::PathBuf;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::CaptureSource;

/// lsof exits with 1 when no file matched the selection.
const NOTHING_FOUND_EXIT_CODE: i32 = 1;

/// Captures open internet sockets with lsof.
///
/// Executes: `lsof -i -P -n -F pcLfPnT`
///
/// Flags explained:
/// - -i: Select internet sockets only
/// - -P: Show port numbers (don't resolve to service names)
/// - -n: Show IP addresses (don't resolve to hostnames)
/// - -F pcLfPnT: Field output with pid, command, login, descriptor,
///   protocol, name and TCP info, one tagged field per line
#[derive(Debug, Clone)]
pub struct LsofCapture {
    program: PathBuf,
}

impl LsofCapture {
    /// Arguments that produce the field grammar the parser expects.
    pub const ARGS: [&'static str; 5] = ["-i", "-P", "-n", "-F", "pcLfPnT"];

    /// Use `lsof` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("lsof")
    }

    /// Use a specific lsof binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check whether the lsof binary can be started.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok()
    }

    /// Turn a finished lsof invocation into capture text.
    fn interpret_output(output: Output) -> Result<String> {
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {}", e)))?;

        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let complaints: Vec<&str> = stderr
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.contains("WARNING"))
            .collect();

        match output.status.code() {
            // lsof also exits 1 when some files could not be examined; keep
            // whatever it managed to print
            Some(NOTHING_FOUND_EXIT_CODE) if !stdout.is_empty() => Ok(stdout),
            Some(NOTHING_FOUND_EXIT_CODE) if complaints.is_empty() => {
                debug!("lsof found no open internet sockets");
                Ok(String::new())
            }
            code => Err(Error::CommandFailed(format!(
                "lsof exited with {}: {}",
                code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c)),
                complaints.join("; ")
            ))),
        }
    }
}

impl Default for LsofCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for LsofCapture {
    async fn capture(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(Self::ARGS)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {}", e)))?;

        let raw = Self::interpret_output(output)?;
        debug!(bytes = raw.len(), "Captured lsof output");
        Ok(raw)
    }
}
