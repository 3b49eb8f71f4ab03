//! Configuration store.
//!
//! Merges a TOML file with `POOLSEARCH_`-prefixed environment variables via
//! Figment and exposes the result behind the [`ConfigStore`] trait, so the
//! build and query paths receive configuration as an injected dependency
//! instead of ambient global state. [`MemoryStore`] backs tests.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defaults;
use crate::types::{Helper, Pool};

/// Tunable bounds for the build pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Upper bound on concurrently running helper extractions.
    pub max_concurrent_extractions: usize,
    /// Wall-clock bound for one helper invocation in seconds, 0 = unbounded.
    pub helper_timeout_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_concurrent_extractions: 30,
            helper_timeout_secs: 60,
        }
    }
}

impl Limits {
    pub fn helper_timeout(&self) -> Option<Duration> {
        (self.helper_timeout_secs > 0).then(|| Duration::from_secs(self.helper_timeout_secs))
    }
}

/// Read-only view of the pool and helper definitions.
///
/// All mutation happens outside this core (the configuration editor is a
/// separate program); the index builder and the query engine only ever read.
pub trait ConfigStore: Send + Sync {
    fn pools(&self) -> Vec<Pool>;
    fn pool(&self, key: &str) -> Option<Pool>;
    fn helper(&self, name: &str) -> Option<Helper>;
    /// Directory holding the persisted per-pool indexes.
    fn data_dir(&self) -> PathBuf;
    /// Resolve a stopword-list identifier to its file. `None` for the
    /// reserved identifier "none" and for identifiers without a file.
    fn stopwords_file(&self, id: &str) -> Option<PathBuf>;
    fn limits(&self) -> Limits;
}

fn none_string() -> String {
    "none".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct HelperEntry {
    extensions: Vec<String>,
    command: String,
    #[serde(default)]
    granularity: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct PoolEntry {
    display_name: String,
    #[serde(default)]
    root: String,
    #[serde(default)]
    helpers: Vec<String>,
    #[serde(default = "none_string")]
    stemming: String,
    #[serde(default = "none_string")]
    stopwords: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigData {
    #[serde(default = "ConfigData::default_data_dir")]
    data_dir: String,
    #[serde(default = "ConfigData::default_stopwords_dir")]
    stopwords_dir: String,
    #[serde(default)]
    limits: Limits,
    #[serde(default)]
    helpers: BTreeMap<String, HelperEntry>,
    #[serde(default)]
    pools: BTreeMap<String, PoolEntry>,
}

impl ConfigData {
    fn default_data_dir() -> String {
        "~/.local/share/poolsearch".to_string()
    }

    fn default_stopwords_dir() -> String {
        "~/.local/share/poolsearch/stopwords".to_string()
    }

    /// The configuration written on first run: the stock helper table and
    /// the eight XDG pools resolved against the user's directories.
    fn with_defaults() -> Self {
        let helpers = defaults::default_helpers()
            .into_iter()
            .map(|h| {
                (
                    h.name,
                    HelperEntry {
                        extensions: h.extensions,
                        command: h.command,
                        granularity: h.granularity,
                    },
                )
            })
            .collect();
        let pools = defaults::default_pools()
            .into_iter()
            .map(|p| {
                (
                    p.key,
                    PoolEntry {
                        display_name: p.display_name,
                        root: p.root.to_string_lossy().into_owned(),
                        helpers: p.helpers,
                        stemming: p.stemming,
                        stopwords: p.stopwords,
                        index_name: None,
                    },
                )
            })
            .collect();
        Self {
            data_dir: Self::default_data_dir(),
            stopwords_dir: Self::default_stopwords_dir(),
            limits: Limits::default(),
            helpers,
            pools,
        }
    }
}

/// Store backed by a TOML file plus environment overrides.
pub struct TomlStore {
    data: ConfigData,
}

impl TomlStore {
    /// Load from the default location, generating a default configuration
    /// from the XDG tables when none exists yet.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bootstrap(path)?;
        }
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("POOLSEARCH_"));
        let data: ConfigData = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid configuration {}: {}", path.display(), e))?;
        Ok(Self { data })
    }
}

pub fn default_config_path() -> PathBuf {
    expand_path("~/.config/poolsearch/config.toml")
}

fn bootstrap(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = toml::to_string_pretty(&ConfigData::with_defaults())?;
    std::fs::write(path, rendered)?;
    Ok(())
}

fn to_pool(key: &str, entry: &PoolEntry) -> Pool {
    let index_name = entry
        .index_name
        .clone()
        .unwrap_or_else(|| Pool::derive_index_name(&entry.display_name));
    Pool {
        key: key.to_string(),
        display_name: entry.display_name.clone(),
        root: expand_path(&entry.root),
        helpers: entry.helpers.clone(),
        stemming: entry.stemming.clone(),
        stopwords: entry.stopwords.clone(),
        index_name,
    }
}

impl ConfigStore for TomlStore {
    fn pools(&self) -> Vec<Pool> {
        self.data
            .pools
            .iter()
            .map(|(key, entry)| to_pool(key, entry))
            .collect()
    }

    fn pool(&self, key: &str) -> Option<Pool> {
        self.data
            .pools
            .get(key)
            .map(|entry| to_pool(key, entry))
            .or_else(|| defaults::default_pool(key))
    }

    fn helper(&self, name: &str) -> Option<Helper> {
        self.data
            .helpers
            .get(name)
            .map(|entry| Helper {
                name: name.to_string(),
                extensions: entry.extensions.clone(),
                command: entry.command.clone(),
                granularity: entry.granularity,
            })
            .or_else(|| defaults::default_helpers().into_iter().find(|h| h.name == name))
    }

    fn data_dir(&self) -> PathBuf {
        expand_path(&self.data.data_dir)
    }

    fn stopwords_file(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id == "none" {
            return None;
        }
        let file = expand_path(&self.data.stopwords_dir).join(id);
        file.is_file().then_some(file)
    }

    fn limits(&self) -> Limits {
        self.data.limits.clone()
    }
}

/// In-memory store for tests and for embedding the core without a file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pools: Vec<Pool>,
    helpers: Vec<Helper>,
    data_dir: PathBuf,
    stopword_files: BTreeMap<String, PathBuf>,
    limits: Limits,
}

impl MemoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn add_pool(&mut self, pool: Pool) {
        self.pools.push(pool);
    }

    pub fn add_helper(&mut self, helper: Helper) {
        self.helpers.push(helper);
    }

    pub fn add_stopwords(&mut self, id: impl Into<String>, file: impl Into<PathBuf>) {
        self.stopword_files.insert(id.into(), file.into());
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }
}

impl ConfigStore for MemoryStore {
    fn pools(&self) -> Vec<Pool> {
        self.pools.clone()
    }

    fn pool(&self, key: &str) -> Option<Pool> {
        self.pools.iter().find(|p| p.key == key).cloned()
    }

    fn helper(&self, name: &str) -> Option<Helper> {
        self.helpers.iter().find(|h| h.name == name).cloned()
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn stopwords_file(&self, id: &str) -> Option<PathBuf> {
        self.stopword_files.get(id).cloned()
    }

    fn limits(&self) -> Limits {
        self.limits.clone()
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
