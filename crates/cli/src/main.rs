//! `tsdb` — bulk CSV loader, point query tool, and WAL inspector.

mod args;
mod format;
mod load;
mod query;
mod wal_info;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};
use tsdb_engine::{Store, StoreConfig};
use tsdb_wal::WalConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let exit_code = match &cli.command {
        Command::Load { csv } => run_load(&cli, csv),
        Command::Query { metric, start, end, tags } => run_query(&cli, metric, *start, *end, tags),
        Command::WalInfo => run_wal_info(&cli),
    };
    process::exit(exit_code);
}

fn open_store(cli: &Cli) -> Option<Store> {
    let store = Store::new(StoreConfig::new(cli.dir.clone()));
    match store.initialize() {
        tsdb_engine::InitOutcome::Ok { .. } => Some(store),
        tsdb_engine::InitOutcome::Failed => {
            eprintln!("failed to open store at {}", cli.dir.display());
            None
        }
    }
}

fn run_load(cli: &Cli, csv_path: &std::path::Path) -> i32 {
    let Some(store) = open_store(cli) else { return 1 };
    let result = load::run(&store, csv_path);
    store.shutdown();

    match result {
        Ok(report) => {
            println!("{}", format::load_report(&report, cli.json));
            0
        }
        Err(e) => {
            eprintln!("failed to load {}: {e}", csv_path.display());
            1
        }
    }
}

fn run_query(cli: &Cli, metric: &str, start: i64, end: i64, raw_tags: &[String]) -> i32 {
    let Some(store) = open_store(cli) else { return 1 };
    let filters = query::parse_tag_filters(raw_tags);
    let results = query::run(&store, metric, start, end, &filters);
    println!("{}", format::query_results(&results, cli.json));
    store.shutdown();
    0
}

fn run_wal_info(cli: &Cli) -> i32 {
    let config = WalConfig::new(cli.dir.clone());
    match wal_info::run(&config) {
        Ok(report) => {
            println!("{}", format::wal_info(&report, cli.json));
            0
        }
        Err(e) => {
            eprintln!("failed to inspect WAL at {}: {e}", cli.dir.display());
            1
        }
    }
}
