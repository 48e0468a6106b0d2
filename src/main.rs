use clap::{ArgAction, Parser};
use cuckoo_lib::{CuckooHashTable, TableConfig};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

/// Seeds a small cuckoo hash table and prints it after every insertion.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Rows per hash table
    #[arg(long, default_value_t = 2)]
    table_size: usize,

    /// Key width in bytes
    #[arg(long, default_value_t = 5)]
    key_size: usize,

    /// Value width in bytes
    #[arg(long, default_value_t = 1)]
    value_size: usize,

    /// Hash family seed (defaults to one derived from the wall clock)
    #[arg(long)]
    seed: Option<u32>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Library code logs through the `log` facade.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to set log tracer: {}", e);
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("CUCKOO_LOG")
        .from_env_lossy();

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to install tracing subscriber");
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32)
        .unwrap_or_default()
}

/// Sample keys: variations on `1 2 3 4 5`, padded or truncated to `key_size`.
fn sample_keys(key_size: usize) -> Vec<Vec<u8>> {
    const KEYS: [[u8; 5]; 5] = [
        [1, 2, 3, 4, 5],
        [1, 2, 8, 4, 6],
        [1, 2, 3, 4, 7],
        [1, 3, 3, 4, 8],
        [1, 5, 5, 4, 10],
    ];
    KEYS.iter()
        .map(|k| {
            let mut key = k.to_vec();
            key.resize(key_size, 0);
            key
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.quiet, args.verbose);

    let seed = args.seed.unwrap_or_else(clock_seed);
    println!("Seed: {}", seed);

    let config = TableConfig::new(args.table_size, args.key_size, args.value_size);
    let mut table = CuckooHashTable::with_config(config, seed)?;
    let printable = args.table_size <= 100 && args.key_size < 10;
    if !printable {
        warn!("Table too large to print, only results will be shown");
    }

    let value = vec![4u8; args.value_size];
    if printable {
        print!("{}", table.dump());
    }
    for key in sample_keys(args.key_size) {
        // Narrow keys can truncate two samples to the same bytes.
        if table.contains_key(&key) {
            continue;
        }
        let stored = table.add(&key, &value);
        info!(?key, stored, load = table.load_factor(), "add");
        if !stored {
            println!("Could not insert {:?}: table is full", key);
        }
        if printable {
            print!("{}", table.dump());
        }
    }

    let stats = table.rebuild_stats();
    info!(
        attempts = stats.attempts,
        successes = stats.successes,
        "rebuild statistics"
    );
    Ok(())
}
