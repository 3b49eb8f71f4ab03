use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use poolsearch_core::cancel::CancelToken;
use poolsearch_core::config::{Limits, MemoryStore};
use poolsearch_core::types::{Helper, Pool};
use poolsearch_text::format;
use poolsearch_text::{BuildError, IndexBuilder, QueryEngine};

const POOL_KEY: &str = "XDG_DOCUMENTS_DIR";

fn text_helper(granularity: u32) -> Helper {
    Helper {
        name: "text".to_string(),
        extensions: vec!["txt".to_string()],
        command: "/bin/cat".to_string(),
        granularity,
    }
}

fn documents_pool(root: &Path) -> Pool {
    Pool {
        key: POOL_KEY.to_string(),
        display_name: "Documents".to_string(),
        root: root.to_path_buf(),
        helpers: vec!["text".to_string()],
        stemming: "none".to_string(),
        stopwords: "none".to_string(),
        index_name: "Documents".to_string(),
    }
}

fn store_with(root: &Path, data_dir: &Path, granularity: u32) -> MemoryStore {
    let mut store = MemoryStore::new(data_dir);
    store.add_helper(text_helper(granularity));
    store.add_pool(documents_pool(root));
    store.set_limits(Limits {
        max_concurrent_extractions: 4,
        helper_timeout_secs: 30,
    });
    store
}

#[test]
fn twenty_lines_at_granularity_six_make_four_chunks() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    let mut content = String::new();
    for i in 1..=20 {
        if i == 15 {
            content.push_str("filler with zebra inside\n");
        } else {
            content.push_str(&format!("filler line number {i:02}\n"));
        }
    }
    fs::write(root.path().join("a.txt"), content).expect("write");

    let store = store_with(root.path(), data.path(), 6);
    let summary = IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    assert_eq!(summary.files_total, 1);
    assert_eq!(summary.files_indexed, 1);
    assert_eq!(summary.chunks, 4, "20 lines at granularity 6 -> 6,6,6,2");

    // "zebra" lives only in the third chunk; exactly one hit comes back
    // and it maps to the originating file.
    let engine = QueryEngine::new(&store);
    let matches = engine.query(POOL_KEY, "zebra").expect("query");
    assert_eq!(matches.hits.len(), 1);
    assert!(matches.hits[0].doc_path.ends_with("a.txt"));
    assert!(matches.hits[0].content.contains("zebra"));

    let html = format::format(&matches, "zebra");
    assert!(html.contains("a.txt"));
    assert!(html.contains("<span style=\" font-weight:600;\">zebra</span>"));
}

#[test]
fn empty_pool_root_builds_an_empty_index() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    let store = store_with(root.path(), data.path(), 6);

    let summary = IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    assert_eq!(summary.files_total, 0);
    assert_eq!(summary.chunks, 0);

    let engine = QueryEngine::new(&store);
    assert!(engine.is_built(POOL_KEY));
    let matches = engine.query(POOL_KEY, "anything").expect("query");
    assert!(matches.is_empty());
    assert!(format::format(&matches, "anything").contains("Not found"));
}

#[test]
fn broken_helper_leaves_other_helpers_indexable() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    fs::write(root.path().join("good.txt"), "searchable payload\n").expect("write");
    fs::write(root.path().join("bad.md"), "never extracted\n").expect("write");

    let mut store = MemoryStore::new(data.path());
    store.add_helper(text_helper(6));
    store.add_helper(Helper {
        name: "broken".to_string(),
        extensions: vec!["md".to_string()],
        command: "/no/such/extractor".to_string(),
        granularity: 0,
    });
    let mut pool = documents_pool(root.path());
    pool.helpers = vec!["text".to_string(), "broken".to_string()];
    store.add_pool(pool);

    let summary = IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    assert_eq!(summary.files_total, 2);
    assert_eq!(summary.files_indexed, 1);

    let engine = QueryEngine::new(&store);
    let matches = engine.query(POOL_KEY, "payload").expect("query");
    assert_eq!(matches.hits.len(), 1);
    assert_eq!(engine.query(POOL_KEY, "extracted").expect("query").hits.len(), 0);
}

#[test]
fn cancelled_build_keeps_the_previous_index_intact() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    fs::write(root.path().join("a.txt"), "original seekword\n").expect("write");

    let store = store_with(root.path(), data.path(), 6);
    IndexBuilder::new(&store).build(POOL_KEY).expect("first build");

    // New content appears, but the rebuild is cancelled before it starts
    // scheduling work.
    fs::write(root.path().join("b.txt"), "fresh newword\n").expect("write");
    let token = CancelToken::new();
    token.cancel();
    let result = IndexBuilder::new(&store)
        .with_cancel(token)
        .build(POOL_KEY);
    assert!(matches!(result, Err(BuildError::Cancelled)));

    // The old index answers queries exactly as before and the temporary
    // build directory is gone.
    let engine = QueryEngine::new(&store);
    assert_eq!(engine.query(POOL_KEY, "seekword").expect("query").hits.len(), 1);
    assert_eq!(engine.query(POOL_KEY, "newword").expect("query").hits.len(), 0);
    let entries: Vec<_> = fs::read_dir(data.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1, "only the promoted index remains");
}

#[test]
fn rebuilding_replaces_the_index_content() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    let file = root.path().join("a.txt");
    fs::write(&file, "first alpha\n").expect("write");

    let store = store_with(root.path(), data.path(), 6);
    IndexBuilder::new(&store).build(POOL_KEY).expect("first build");
    fs::write(&file, "second bravo\n").expect("rewrite");
    IndexBuilder::new(&store).build(POOL_KEY).expect("second build");

    let engine = QueryEngine::new(&store);
    assert_eq!(engine.query(POOL_KEY, "alpha").expect("query").hits.len(), 0);
    assert_eq!(engine.query(POOL_KEY, "bravo").expect("query").hits.len(), 1);
}

#[test]
fn query_without_an_index_is_recoverable() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    let store = store_with(root.path(), data.path(), 6);

    let engine = QueryEngine::new(&store);
    assert!(!engine.is_built(POOL_KEY));
    let result = engine.query(POOL_KEY, "anything");
    assert!(matches!(
        result,
        Err(poolsearch_text::QueryError::IndexUnavailable { .. })
    ));
}

#[test]
fn results_are_capped_at_the_page_size() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    for i in 0..12 {
        fs::write(
            root.path().join(format!("f{i}.txt")),
            format!("common payload number {i}\n"),
        )
        .expect("write");
    }

    let store = store_with(root.path(), data.path(), 6);
    IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    let engine = QueryEngine::new(&store);
    let matches = engine.query(POOL_KEY, "common").expect("query");
    assert_eq!(matches.hits.len(), 10);
}

#[test]
fn stopwords_are_not_queryable() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    fs::write(root.path().join("a.txt"), "the cat sat\n").expect("write");
    let stopword_file = data.path().join("english.list");
    fs::write(&stopword_file, "the\nand\n").expect("write stopwords");

    let mut store = MemoryStore::new(data.path().join("indexes"));
    store.add_helper(text_helper(6));
    let mut pool = documents_pool(root.path());
    pool.stopwords = "english".to_string();
    store.add_pool(pool);
    store.add_stopwords("english", &stopword_file);

    IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    let engine = QueryEngine::new(&store);
    assert_eq!(engine.query(POOL_KEY, "the").expect("query").hits.len(), 0);
    assert_eq!(engine.query(POOL_KEY, "cat").expect("query").hits.len(), 1);
}

#[test]
fn stemming_matches_inflected_forms() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    fs::write(root.path().join("a.txt"), "runners running daily\n").expect("write");

    let mut store = MemoryStore::new(data.path());
    store.add_helper(text_helper(6));
    let mut pool = documents_pool(root.path());
    pool.stemming = "en".to_string();
    store.add_pool(pool);

    IndexBuilder::new(&store).build(POOL_KEY).expect("build");
    let engine = QueryEngine::new(&store);
    assert_eq!(engine.query(POOL_KEY, "run").expect("query").hits.len(), 1);
}

#[test]
fn progress_is_monotone_and_reaches_completion() {
    let root = TempDir::new().expect("root");
    let data = TempDir::new().expect("data");
    for i in 0..5 {
        fs::write(root.path().join(format!("f{i}.txt")), "payload\n").expect("write");
    }

    let store = store_with(root.path(), data.path(), 6);
    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    IndexBuilder::new(&store)
        .with_progress(move |pct| sink.lock().expect("lock").push(pct))
        .build(POOL_KEY)
        .expect("build");

    let seen = seen.lock().expect("lock");
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(*seen.last().expect("at least one report"), 100);
}

#[test]
fn build_all_rebuilds_every_configured_pool() {
    let root_a = TempDir::new().expect("root a");
    let root_b = TempDir::new().expect("root b");
    let data = TempDir::new().expect("data");
    fs::write(root_a.path().join("a.txt"), "apples\n").expect("write");
    fs::write(root_b.path().join("b.txt"), "bananas\n").expect("write");

    let mut store = MemoryStore::new(data.path());
    store.add_helper(text_helper(6));
    store.add_pool(documents_pool(root_a.path()));
    store.add_pool(Pool {
        key: "XDG_MUSIC_DIR".to_string(),
        display_name: "Music".to_string(),
        root: root_b.path().to_path_buf(),
        helpers: vec!["text".to_string()],
        stemming: "none".to_string(),
        stopwords: "none".to_string(),
        index_name: "Music".to_string(),
    });

    let results = IndexBuilder::new(&store).build_all();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let engine = QueryEngine::new(&store);
    assert_eq!(engine.query(POOL_KEY, "apples").expect("query").hits.len(), 1);
    assert_eq!(engine.query("XDG_MUSIC_DIR", "bananas").expect("query").hits.len(), 1);
}
