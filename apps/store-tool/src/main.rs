//! Command-line front end for the bookstore catalog.
//!
//! Loads the catalog schema and seed files into a fresh store, then runs one
//! inspection command against it.

mod cli;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use relstore_core::{BulkLoader, Store, StoreConfig, Value};
use relstore_model::{bookstore, Bookstore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    let mut config = match path {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => StoreConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    Ok(config)
}

fn init_tracing(config: &StoreConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defines the catalog, loads the configured seed tables, and registers kinds.
fn open_catalog(config: StoreConfig) -> Result<Bookstore> {
    let store = Store::with_config(config);
    bookstore::define_schema(&store).context("failed to define catalog tables")?;

    let tables: Vec<String> = if store.config().seed_tables.is_empty() {
        bookstore::TABLES.iter().map(|t| t.to_string()).collect()
    } else {
        store.config().seed_tables.clone()
    };
    let seed_dir = store.config().seed_dir.clone();
    let report = BulkLoader::new(&store)
        .load_dir(&seed_dir, &tables)
        .with_context(|| format!("failed to load seed files from {}", seed_dir.display()))?;
    info!(
        rows = report.total(),
        skipped = report.skipped.len(),
        "catalog loaded"
    );

    Bookstore::register(&store).context("failed to register catalog kinds")
}

fn summary(store: &Store) -> Result<()> {
    for table in store.table_names()? {
        let count = store.dataset(&table).count()?;
        println!("{:<14} {:>6}", table, count);
    }
    Ok(())
}

fn group(store: &Store, table: &str, column: &str) -> Result<()> {
    let groups = store
        .dataset(table)
        .group_and_count(column)
        .with_context(|| format!("cannot group {} by {}", table, column))?;
    for (value, count) in groups {
        match value {
            Value::Null => println!("{:<24} {:>6}", "(null)", count),
            value => println!("{:<24} {:>6}", value.to_string(), count),
        }
    }
    Ok(())
}

fn dump(store: &Store) -> Result<()> {
    let image = store.export()?;
    println!("{}", serde_json::to_string_pretty(&image)?);
    Ok(())
}

fn validate(catalog: &Bookstore) -> Result<()> {
    let registry = &catalog.registry;
    let kinds: Vec<String> = registry.kind_names().map(str::to_string).collect();

    let mut invalid = 0;
    for name in kinds {
        let kind = registry.kind(&name)?;
        for mut model in registry.all_of(kind)? {
            if !model.is_valid()? {
                invalid += 1;
                let id = model.id().map_or_else(|| "?".to_string(), |id| id.to_string());
                println!("{} #{}: {}", name, id, model.errors());
            }
        }
    }

    if invalid > 0 {
        warn!(invalid, "catalog has invalid rows");
        bail!("{} invalid rows", invalid);
    }
    println!("all rows valid");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed_dir) = cli.seed_dir {
        config.seed_dir = seed_dir;
    }
    init_tracing(&config);

    let catalog = open_catalog(config)?;
    let store = catalog.registry.store();

    match cli.command {
        Commands::Summary => summary(store),
        Commands::Group { table, column } => group(store, &table, &column),
        Commands::Dump => dump(store),
        Commands::Validate => validate(&catalog),
    }
}
