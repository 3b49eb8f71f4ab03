use std::env;

use poolsearch_core::config::TomlStore;
use poolsearch_text::{format, QueryEngine, QueryError};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let Some(pool_key) = args.next() else {
        eprintln!("Usage: poolsearch-query <pool-key> <terms>...");
        std::process::exit(1);
    };
    let terms: Vec<String> = args.collect();
    if terms.is_empty() {
        eprintln!("Usage: poolsearch-query <pool-key> <terms>...");
        std::process::exit(1);
    }
    let query_string = terms.join(" ");

    let store = TomlStore::load()?;
    let engine = QueryEngine::new(&store);
    match engine.query(&pool_key, &query_string) {
        Ok(matches) => {
            println!("{}", format::format(&matches, &query_string));
            Ok(())
        }
        Err(QueryError::IndexUnavailable { pool }) => {
            eprintln!(
                "The {pool} pool has no usable index; rebuild it with: poolsearch-indexer {pool_key}"
            );
            std::process::exit(2);
        }
        Err(error) => Err(error.into()),
    }
}
