use thiserror::Error;

/// Fatal failure of one pool build. The previous persisted index is left
/// intact whenever one of these is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown pool `{0}`")]
    UnknownPool(String),

    #[error("index engine failure: {0}")]
    Engine(#[from] tantivy::TantivyError),

    #[error("i/o failure while building index: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to start extraction workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("build cancelled")]
    Cancelled,

    #[error("index writer stopped unexpectedly")]
    WriterStopped,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown pool `{0}`")]
    UnknownPool(String),

    /// The pool has no openable index. Recoverable: rebuild and retry.
    #[error("index for pool `{pool}` is unavailable, rebuild required")]
    IndexUnavailable { pool: String },

    #[error("index engine failure: {0}")]
    Engine(#[from] tantivy::TantivyError),
}
