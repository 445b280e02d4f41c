mod config;
mod error;
mod export;
mod ledger;
mod models;
mod report;
mod repository;
mod run;
mod ui;

use anyhow::Result;
use tracing::{error, info};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;
    config::init_tracing(&config)?;
    info!(db = %config.db_path.display(), "starting");

    let store = repository::Store::open(&config.db_path)?;
    ledger::Ledger::on_store(&store).seed_default_categories()?;

    let result = match args.len() {
        1 => run::as_tui(&store),
        _ => run::as_cli(&args, &store),
    };
    finish(result, store.close())
}

/// The run's own error wins over a failed close; a close failure is always
/// logged.
fn finish(result: Result<()>, closed: Result<()>) -> Result<()> {
    if let Err(e) = &closed {
        error!(error = %e, "failed to close expense store");
    }
    result.and(closed)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
