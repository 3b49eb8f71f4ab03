//! Domain types shared by the discovery, extraction and index layers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum number of hits returned for one query.
pub const PAGE_SIZE: usize = 10;

/// Number of non-blank lines kept by the preview mode (granularity 0).
pub const PREVIEW_LINES: usize = 15;

/// One named content source: a root directory plus the extraction rules and
/// the persisted index attached to it.
///
/// - `key`: stable XDG-style identity (e.g. `XDG_DOCUMENTS_DIR`)
/// - `display_name`: localized name shown to the user
/// - `root`: directory scanned when the pool is rebuilt
/// - `helpers`: ordered names of the helpers bound to this pool
/// - `stemming`: language code for the stemmer, "none" disables stemming
/// - `stopwords`: stopword-list identifier, "none" disables filtering
/// - `index_name`: directory name of the persisted index under the data dir
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub key: String,
    pub display_name: String,
    pub root: PathBuf,
    pub helpers: Vec<String>,
    pub stemming: String,
    pub stopwords: String,
    pub index_name: String,
}

impl Pool {
    /// Derive a persisted-index name from a display name.
    ///
    /// The result must be a single filesystem path component, so path
    /// separators and NUL are replaced.
    pub fn derive_index_name(display_name: &str) -> String {
        let cleaned: String = display_name
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
            .collect();
        if cleaned.is_empty() {
            "unnamed".to_string()
        } else {
            cleaned
        }
    }
}

/// An external extraction program bound to a set of file extensions.
///
/// `command` is a whitespace-separated program plus fixed arguments; the
/// file to extract is appended as the final argument when the helper runs.
/// `granularity` 0 means one preview chunk of at most [`PREVIEW_LINES`]
/// lines, N > 0 means chunks of up to N non-blank lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Helper {
    pub name: String,
    pub extensions: Vec<String>,
    pub command: String,
    pub granularity: u32,
}

/// Raw text captured from one helper run against one file. Ephemeral.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub path: PathBuf,
    pub text: String,
}

/// One indexable unit of text, tagged with the path of the file it came
/// from so every chunk of a file maps back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub doc_path: String,
    pub content: String,
}
