//! dexcache - Read-through catalog cache
//!
//! Main entry point for the dexcache CLI. The cache lives in memory, so every
//! command populates it from the upstream catalog first.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dexcache::config::DexCacheConfig;
use dexcache::population::PopulationStats;
use dexcache::cache::parse_key;
use dexcache::{style, CacheService, DetailRecord, DexCacheError, LookupStatus};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// dexcache - mirror a remote creature catalog into memory
#[derive(Parser, Debug)]
#[command(name = "dexcache")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/dexcache/config.yaml)
    #[arg(short, long, env = "DEXCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the upstream base URL
    #[arg(long, env = "DEXCACHE_BASE_URL")]
    base_url: Option<String>,

    /// Give up waiting for population after this many seconds
    #[arg(short, long, default_value = "600")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Populate the cache and print a summary
    Populate {
        /// Print Prometheus metrics after population
        #[arg(long)]
        metrics: bool,
    },

    /// Populate, then print one record as JSON
    Show {
        /// Record id (e.g., 25)
        id: String,
    },

    /// Populate, then list cached ids and names
    List {
        /// Only list the first N records
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = dexcache::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style::error("Error:"), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config, force);
    }

    // Reject malformed ids before paying for a full population
    if let Commands::Show { id } = &cli.command {
        parse_key(id)?;
    }

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(base_url) = cli.base_url {
        config.upstream.base_url = base_url;
    }

    let service = CacheService::start(&config).context("Failed to start cache")?;
    let stats = populate(&service, cli.timeout).await?;

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Populate { metrics } => {
            print_summary(&service, &stats);
            if metrics {
                println!();
                print!("{}", dexcache::metrics::encode_metrics());
            }
        }

        Commands::Show { id } => {
            let id = parse_key(&id)?;
            match service.lookup_status(id) {
                LookupStatus::Cached(record) => print_record(&record)?,
                status => anyhow::bail!(
                    "No record {} in catalog ({})",
                    style::record_id(id),
                    style::lookup_status(&status)
                ),
            }
        }

        Commands::List { limit } => {
            let records = service.all();
            let shown = limit.unwrap_or(records.len()).min(records.len());

            println!(
                "{} {} records",
                style::header("Cached:"),
                style::count_cached(records.len() as u64)
            );
            println!();
            for record in records.iter().take(shown) {
                println!(
                    "  {} {}",
                    style::record_id(record.id),
                    record.name().unwrap_or("<unnamed>")
                );
            }
            if shown < records.len() {
                println!(
                    "  {}",
                    style::dim(&format!("... {} more", records.len() - shown))
                );
            }
        }
    }

    service.shutdown().await?;
    Ok(())
}

fn handle_init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(DexCacheConfig::default_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    DexCacheConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} {}",
        style::success("Wrote default configuration to"),
        style::path(&path.display().to_string())
    );
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> dexcache::Result<DexCacheConfig> {
    let config = match path {
        Some(path) => DexCacheConfig::load(path)?,
        None => DexCacheConfig::load_or_default()?,
    };
    tracing::info!(base_url = %config.upstream.base_url, "Configuration loaded");
    Ok(config)
}

/// Seed and wait for the fan-out to finish
async fn populate(service: &CacheService, timeout_secs: u64) -> dexcache::Result<PopulationStats> {
    let population = service.population();

    let references = population.seed().await?;
    eprintln!(
        "{} {} references",
        style::dim("Populating"),
        style::count_cached(references as u64)
    );

    tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        population.wait_for_completion(),
    )
    .await
    .map_err(|_| DexCacheError::Timeout(timeout_secs))??;

    Ok(population.stats())
}

fn print_summary(service: &CacheService, stats: &PopulationStats) {
    println!("{}", style::header("Population complete"));
    println!(
        "  entries:  {}",
        style::count_cached(service.store().count() as u64)
    );
    println!("  fetched:  {}", stats.attempts);
    println!("  retries:  {}", style::count_retries(stats.retries));
    println!("  dropped:  {}", style::count_dropped(stats.dropped));
}

fn print_record(record: &DetailRecord) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    println!("{}", json);
    if let Some(name) = record.name() {
        eprintln!("{} {}", style::record_id(record.id), style::dim(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexcache::InvalidKeyError;

    #[tokio::test]
    async fn test_show_rejects_bad_id_before_populating() {
        // Nothing listens here, so reaching population would fail differently
        let cli = Cli::try_parse_from([
            "dexcache",
            "--base-url",
            "http://127.0.0.1:9",
            "show",
            "abc",
        ])
        .unwrap();

        let err = tokio::time::timeout(Duration::from_secs(5), run(cli))
            .await
            .expect("show waited on population")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<InvalidKeyError>(),
            Some(&InvalidKeyError::new("abc"))
        );
    }
}
