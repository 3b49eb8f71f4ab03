use thiserror::Error;

/// Failure of one helper run against one file. Never fatal to a build: the
/// file simply contributes no chunks.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to launch helper `{command}`: {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("helper `{command}` did not finish within {seconds}s")]
    TimedOut { command: String, seconds: u64 },
}
