use std::env;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use poolsearch_core::config::{ConfigStore, TomlStore};
use poolsearch_text::IndexBuilder;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut all = false;
    let mut config_path: Option<PathBuf> = None;
    let mut pool_key: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--all" | "-a" => all = true,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path");
                    std::process::exit(1);
                }
            }
            _ if !args[i].starts_with('-') => pool_key = Some(args[i].clone()),
            other => {
                eprintln!("Error: unknown option {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let store = match &config_path {
        Some(path) => TomlStore::load_from(path)?,
        None => TomlStore::load()?,
    };

    if all {
        println!("Rebuilding all pools");
        let results = IndexBuilder::new(&store).build_all();
        let mut failed = 0usize;
        for (key, result) in results {
            match result {
                Ok(summary) => println!(
                    "  {key}: {} files, {} chunks",
                    summary.files_indexed, summary.chunks
                ),
                Err(error) => {
                    failed += 1;
                    eprintln!("  {key}: {error}");
                }
            }
        }
        if failed > 0 {
            anyhow::bail!("{failed} pool build(s) failed");
        }
        return Ok(());
    }

    let Some(pool_key) = pool_key else {
        eprintln!("Usage: poolsearch-indexer [--config <file>] <pool-key> | --all");
        eprintln!("Configured pools:");
        for pool in store.pools() {
            eprintln!("  {}  ({})", pool.key, pool.display_name);
        }
        std::process::exit(1);
    };

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress_bar = bar.clone();
    let summary = IndexBuilder::new(&store)
        .with_progress(move |pct| progress_bar.set_position(u64::from(pct)))
        .build(&pool_key)?;
    bar.finish_and_clear();
    println!(
        "Indexed {} of {} files ({} chunks) for {pool_key}",
        summary.files_indexed, summary.files_total, summary.chunks
    );
    Ok(())
}
