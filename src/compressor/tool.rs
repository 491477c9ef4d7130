//! External compressor invocation
//!
//! Wraps the Ghostscript command line (or a compatible substitute). The
//! tool writes to the scratch path and must never modify its input; the
//! caller owns the scratch file's lifetime.

use crate::config::{PressConfig, Quality};
use crate::error::{ToolError, ToolResult};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// Poll interval while waiting on a time-limited invocation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle for invoking the external compressor
#[derive(Debug, Clone)]
pub struct Compressor {
    program: String,
    quality: Quality,
    timeout: Option<Duration>,
}

impl Compressor {
    /// Create a compressor handle
    pub fn new(program: impl Into<String>, quality: Quality, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            quality,
            timeout,
        }
    }

    /// Create a compressor handle from validated configuration
    pub fn from_config(config: &PressConfig) -> Self {
        Self::new(config.compressor.clone(), config.quality, config.tool_timeout)
    }

    /// Run the tool, writing the compressed document to `output`.
    ///
    /// Returns `Ok(())` on a zero exit status. Spawn failures, non-zero
    /// exits, and timeout kills all map to `ToolError`.
    pub fn run(&self, input: &Path, output: &Path) -> ToolResult<()> {
        trace!(
            program = %self.program,
            input = %input.display(),
            output = %output.display(),
            "Invoking compressor"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("-sDEVICE=pdfwrite")
            .arg("-dCompatibilityLevel=1.4")
            .arg(format!("-dPDFSETTINGS={}", self.quality.gs_setting()))
            .arg("-dNOPAUSE")
            .arg("-dQUIET")
            .arg("-dBATCH")
            .arg(format!("-sOutputFile={}", output.display()))
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        match self.timeout {
            None => self.run_to_completion(cmd),
            Some(limit) => self.run_with_deadline(cmd, limit),
        }
    }

    fn run_to_completion(&self, mut cmd: Command) -> ToolResult<()> {
        let output = cmd.output().map_err(|e| ToolError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                program: self.program.clone(),
                status: describe_status(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn run_with_deadline(&self, mut cmd: Command, limit: Duration) -> ToolResult<()> {
        let mut child = cmd.spawn().map_err(|e| ToolError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        let started = Instant::now();
        loop {
            let status = child.try_wait().map_err(|e| ToolError::Wait {
                program: self.program.clone(),
                source: e,
            })?;

            if let Some(status) = status {
                let output = child.wait_with_output().map_err(|e| ToolError::Wait {
                    program: self.program.clone(),
                    source: e,
                })?;

                return if status.success() {
                    Ok(())
                } else {
                    Err(ToolError::Failed {
                        program: self.program.clone(),
                        status: describe_status(status),
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    })
                };
            }

            if started.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Timeout {
                    program: self.program.clone(),
                    seconds: limit.as_secs(),
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure() {
        let compressor = Compressor::new("definitely-not-a-real-binary", Quality::Ebook, None);
        let err = compressor
            .run(Path::new("in.pdf"), Path::new("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failed() {
        // `false` ignores the gs-style arguments and exits 1
        let compressor = Compressor::new("false", Quality::Ebook, None);
        let err = compressor
            .run(Path::new("in.pdf"), Path::new("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_ok() {
        let compressor = Compressor::new("true", Quality::Ebook, None);
        assert!(compressor
            .run(Path::new("in.pdf"), Path::new("out.pdf"))
            .is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_the_tool() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let compressor = Compressor::new(
            script.display().to_string(),
            Quality::Ebook,
            Some(Duration::from_millis(200)),
        );

        let started = Instant::now();
        let err = compressor
            .run(Path::new("in.pdf"), Path::new("out.pdf"))
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
