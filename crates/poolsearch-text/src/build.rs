//! Pool index construction.
//!
//! A build writes to a temporary index inside the data directory and only
//! replaces the pool's current index after everything completed
//! uncancelled, so readers always see either the fully-old or the
//! fully-new index. Extraction runs on a bounded worker pool; the single
//! tantivy writer lives on its own thread and drains completed chunks from
//! a channel.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use rayon::prelude::*;
use tantivy::{doc, Index};
use tracing::{info, warn};

use poolsearch_core::cancel::CancelToken;
use poolsearch_core::chunker;
use poolsearch_core::config::ConfigStore;
use poolsearch_core::discovery;
use poolsearch_core::extract::HelperRunner;
use poolsearch_core::types::{DocumentChunk, Helper, Pool};

use crate::analyzer;
use crate::error::BuildError;

/// Memory budget handed to the tantivy writer.
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Backpressure bound between extraction workers and the writer thread,
/// in per-file chunk batches.
const INGEST_QUEUE_BATCHES: usize = 64;

/// Counts reported after a successful build.
#[derive(Debug, Clone, Copy)]
pub struct BuildSummary {
    /// Files matched by the pre-scan across all helpers.
    pub files_total: usize,
    /// Files that contributed at least one chunk.
    pub files_indexed: usize,
    /// Chunks ingested into the new index.
    pub chunks: usize,
}

/// Builds (or rebuilds) the persisted index of one pool.
pub struct IndexBuilder<'a> {
    store: &'a dyn ConfigStore,
    cancel: CancelToken,
    progress: Option<Box<dyn Fn(u8) + Send + Sync>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self {
            store,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Share a cancellation token with the caller. Cancelling stops new
    /// extractions promptly and discards the temporary index.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Receive a monotonically non-decreasing completion percentage
    /// (0-100) as files finish.
    #[must_use]
    pub fn with_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Rebuild every configured pool, one independent build per thread.
    /// Pools share no index state, so the builds only join at the end.
    pub fn build_all(&self) -> Vec<(String, Result<BuildSummary, BuildError>)> {
        let pools = self.store.pools();
        thread::scope(|scope| {
            let handles: Vec<_> = pools
                .iter()
                .map(|pool| {
                    let key = pool.key.clone();
                    (key.clone(), scope.spawn(move || self.build(&key)))
                })
                .collect();
            handles
                .into_iter()
                .map(|(key, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or(Err(BuildError::WriterStopped));
                    (key, result)
                })
                .collect()
        })
    }

    /// Build a fresh index for `pool_key` and atomically promote it.
    pub fn build(&self, pool_key: &str) -> Result<BuildSummary, BuildError> {
        let pool = self
            .store
            .pool(pool_key)
            .ok_or_else(|| BuildError::UnknownPool(pool_key.to_string()))?;
        let limits = self.store.limits();
        let runner = HelperRunner::new(limits.helper_timeout());

        // Helpers the configuration no longer knows are skipped, matching
        // the tolerance for partially edited setups.
        let helpers: Vec<Helper> = pool
            .helpers
            .iter()
            .filter_map(|name| {
                let helper = self.store.helper(name);
                if helper.is_none() {
                    warn!(pool = %pool.key, helper = %name, "unknown helper, skipping");
                }
                helper
            })
            .collect();

        // Pre-scan to learn the progress denominator; the collected lists
        // also drive the build so the tree is only walked once.
        let work: Vec<(Helper, Vec<PathBuf>)> = helpers
            .into_iter()
            .map(|helper| {
                let files: Vec<PathBuf> =
                    discovery::matching_files(&pool.root, &helper.extensions).collect();
                (helper, files)
            })
            .collect();
        let files_total: usize = work.iter().map(|(_, files)| files.len()).sum();
        info!(pool = %pool.key, files = files_total, "starting pool build");

        let data_dir = self.store.data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let tmp = tempfile::Builder::new()
            .prefix(&format!(".{}-build-", pool.index_name))
            .tempdir_in(&data_dir)?;

        let schema = analyzer::build_schema();
        let index = Index::create_in_dir(tmp.path(), schema.clone())?;
        analyzer::register_analyzer(
            &index,
            &pool.stemming,
            self.store.stopwords_file(&pool.stopwords).as_deref(),
        );
        let path_field = schema.get_field(analyzer::PATH_FIELD)?;
        let content_field = schema.get_field(analyzer::CONTENT_FIELD)?;
        let writer = index.writer(WRITER_MEMORY_BYTES)?;

        // Single-writer actor: the only handle to the index writer lives on
        // this thread, extraction workers just send completed chunks.
        let (tx, rx) = mpsc::sync_channel::<Vec<DocumentChunk>>(INGEST_QUEUE_BATCHES);
        let ingest = thread::spawn(move || -> Result<usize, tantivy::TantivyError> {
            let mut writer = writer;
            let mut ingested = 0usize;
            for batch in rx {
                for chunk in batch {
                    writer.add_document(doc!(
                        path_field => chunk.doc_path,
                        content_field => chunk.content,
                    ))?;
                    ingested += 1;
                }
            }
            writer.commit()?;
            writer.wait_merging_threads()?;
            Ok(ingested)
        });

        let processed = AtomicUsize::new(0);
        let files_indexed = AtomicUsize::new(0);
        let last_pct = Mutex::new(0u8);
        let report = |done: usize| {
            if let Some(callback) = &self.progress {
                let pct = if files_total == 0 {
                    100
                } else {
                    u8::try_from((done * 100 / files_total).min(100)).unwrap_or(100)
                };
                if let Ok(mut last) = last_pct.lock() {
                    if pct > *last || (pct == 0 && done == 0) {
                        *last = pct;
                        callback(pct);
                    }
                }
            }
        };
        report(0);

        let worker_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(limits.max_concurrent_extractions.max(1))
            .build()?;
        worker_pool.install(|| {
            for (helper, files) in &work {
                files.par_iter().for_each(|path| {
                    // Cancellation stops scheduling work; in-flight files
                    // are allowed to finish.
                    if self.cancel.is_cancelled() {
                        return;
                    }
                    match runner.run(path, helper) {
                        Ok(extraction) => {
                            let doc_path = extraction.path.to_string_lossy().into_owned();
                            let chunks: Vec<DocumentChunk> =
                                chunker::split(&extraction.text, helper.granularity)
                                    .map(|content| DocumentChunk {
                                        doc_path: doc_path.clone(),
                                        content,
                                    })
                                    .collect();
                            if !chunks.is_empty() {
                                files_indexed.fetch_add(1, Ordering::SeqCst);
                                // A closed channel means the writer died;
                                // the join below reports the real error.
                                let _ = tx.send(chunks);
                            }
                        }
                        Err(error) => {
                            warn!(path = %path.display(), %error,
                                "extraction failed, file contributes no chunks");
                        }
                    }
                    report(processed.fetch_add(1, Ordering::SeqCst) + 1);
                });
            }
        });
        drop(tx);

        let chunks = match ingest.join() {
            Ok(result) => result?,
            Err(_) => return Err(BuildError::WriterStopped),
        };

        if self.cancel.is_cancelled() {
            info!(pool = %pool.key, "build cancelled, temporary index discarded");
            return Err(BuildError::Cancelled);
        }

        promote(tmp, &data_dir, &pool)?;
        report(files_total.max(1));
        info!(pool = %pool.key, chunks, "pool index promoted");
        Ok(BuildSummary {
            files_total,
            files_indexed: files_indexed.into_inner(),
            chunks,
        })
    }
}

/// Replace the pool's current index with the finished temporary one.
///
/// The current index stays valid and queryable until the rename; a crash
/// before that leaves it untouched, a crash between the two renames leaves
/// the previous index recoverable under the `.old` name.
fn promote(tmp: tempfile::TempDir, data_dir: &Path, pool: &Pool) -> Result<(), BuildError> {
    let built = tmp.keep();
    let current = data_dir.join(&pool.index_name);
    let result = (|| -> std::io::Result<()> {
        if current.exists() {
            let old = data_dir.join(format!("{}.old", pool.index_name));
            if old.exists() {
                std::fs::remove_dir_all(&old)?;
            }
            std::fs::rename(&current, &old)?;
            std::fs::rename(&built, &current)?;
            std::fs::remove_dir_all(&old)?;
        } else {
            std::fs::rename(&built, &current)?;
        }
        Ok(())
    })();
    if result.is_err() {
        let _ = std::fs::remove_dir_all(&built);
    }
    result.map_err(BuildError::Io)
}
