//! Read-only query path over a pool's persisted index.

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{Index, TantivyDocument};
use tracing::debug;

use poolsearch_core::config::ConfigStore;
use poolsearch_core::types::PAGE_SIZE;

use crate::analyzer;
use crate::error::QueryError;

/// One ranked hit: the originating file plus the stored chunk text.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub doc_path: String,
    pub content: String,
}

/// Rank-ordered result of one query, best hit first, at most
/// [`PAGE_SIZE`] entries.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    pub hits: Vec<SearchHit>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Opens a pool's current index read-only and executes queries against it.
/// Never writes; may run concurrently with a build of the same pool.
pub struct QueryEngine<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Whether the pool has a persisted index to query.
    pub fn is_built(&self, pool_key: &str) -> bool {
        self.store
            .pool(pool_key)
            .map(|pool| self.store.data_dir().join(pool.index_name).is_dir())
            .unwrap_or(false)
    }

    /// Execute `query_string` against the pool's current index.
    ///
    /// The query is parsed leniently: unparsable fragments are dropped
    /// rather than failing the whole query. An index that cannot be opened
    /// surfaces as the recoverable [`QueryError::IndexUnavailable`].
    pub fn query(&self, pool_key: &str, query_string: &str) -> Result<MatchSet, QueryError> {
        let pool = self
            .store
            .pool(pool_key)
            .ok_or_else(|| QueryError::UnknownPool(pool_key.to_string()))?;
        let index_dir = self.store.data_dir().join(&pool.index_name);
        let index = Index::open_in_dir(&index_dir).map_err(|error| {
            debug!(pool = %pool.key, %error, "could not open index");
            QueryError::IndexUnavailable {
                pool: pool.display_name.clone(),
            }
        })?;
        analyzer::register_analyzer(
            &index,
            &pool.stemming,
            self.store.stopwords_file(&pool.stopwords).as_deref(),
        );

        let schema = index.schema();
        let path_field = schema.get_field(analyzer::PATH_FIELD)?;
        let content_field = schema.get_field(analyzer::CONTENT_FIELD)?;
        let reader = index.reader()?;
        let searcher = reader.searcher();

        let parser = QueryParser::for_index(&index, vec![content_field]);
        let (query, parse_errors) = parser.parse_query_lenient(query_string);
        if !parse_errors.is_empty() {
            debug!(pool = %pool.key, ?parse_errors, "query parsed partially");
        }

        let top_docs = searcher.search(&query, &TopDocs::with_limit(PAGE_SIZE))?;
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let doc_path = doc
                .get_first(path_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let content = doc
                .get_first(content_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            hits.push(SearchHit {
                score,
                doc_path,
                content,
            });
        }
        Ok(MatchSet { hits })
    }
}
