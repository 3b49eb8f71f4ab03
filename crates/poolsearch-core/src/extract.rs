//! Helper process execution.
//!
//! A helper is a file-type-specific external program. The runner builds an
//! argv from the helper's command template, appends the file path as the
//! final argument and captures standard output as the extracted text.
//! Standard error is discarded and the exit code is not inspected: helpers
//! are allowed to emit partial output and then fail.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ExtractionError;
use crate::types::{ExtractionResult, Helper};

const EXIT_POLL: Duration = Duration::from_millis(10);

/// Runs one helper command against one file per call. The caller controls
/// concurrency; the runner itself is stateless apart from its time limit.
#[derive(Debug, Clone)]
pub struct HelperRunner {
    timeout: Option<Duration>,
}

impl HelperRunner {
    /// `timeout` bounds one helper invocation's wall-clock time; `None`
    /// lets the helper run unbounded.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Spawn the helper for `path` and capture its stdout.
    ///
    /// Fails only when the child cannot be started or outlives the time
    /// limit. A non-zero exit code still returns whatever output was
    /// captured, possibly empty.
    pub fn run(&self, path: &Path, helper: &Helper) -> Result<ExtractionResult, ExtractionError> {
        let mut parts = helper.command.split_whitespace();
        let program = parts.next().ok_or_else(|| ExtractionError::LaunchFailed {
            command: helper.command.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command template",
            ),
        })?;

        let mut child = Command::new(program)
            .args(parts)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExtractionError::LaunchFailed {
                command: helper.command.clone(),
                source,
            })?;

        // Drain stdout on its own thread so a helper blocked on a full pipe
        // cannot stall the exit poll below.
        let reader = child.stdout.take().map(|mut out| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = out.read_to_end(&mut buf);
                buf
            })
        });

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    return Err(ExtractionError::LaunchFailed {
                        command: helper.command.clone(),
                        source,
                    })
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let _ = child.kill();
                let _ = child.wait();
                if let Some(handle) = reader {
                    let _ = handle.join();
                }
                return Err(ExtractionError::TimedOut {
                    command: helper.command.clone(),
                    seconds: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                });
            }
            thread::sleep(EXIT_POLL);
        };

        let bytes = reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        if !status.success() {
            debug!(command = %helper.command, path = %path.display(), %status,
                "helper exited with failure, keeping captured output");
        }
        Ok(ExtractionResult {
            path: path.to_path_buf(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
