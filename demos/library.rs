//! Demo application running many readers and writers over one collection.
//!
//! Run with:
//! ```bash
//! cargo run --example library --features demo -- --help
//! ```
//!
//! Without arguments it reproduces the reference scale: 100 readers,
//! 10 writers and a one hour deadline. Readers never stop by themselves, so
//! the run always ends at the deadline with the readers abandoned.

use anyhow::Context;
use biblioteca::orchestrator::{Library, LibraryConfig};
use biblioteca::snapshot::CollectionSnapshot;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Demo application for biblioteca - a thread-safe observable collection.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of reader tasks
    #[arg(short, long, default_value = "100")]
    readers: usize,

    /// Number of writer tasks (one book each)
    #[arg(short, long, default_value = "10")]
    writers: usize,

    /// Pause between two reader polls, in milliseconds
    #[arg(long, default_value = "100")]
    read_interval_ms: u64,

    /// Pause after each writer addition, in milliseconds
    #[arg(long, default_value = "500")]
    write_pause_ms: u64,

    /// How long to wait for the pool to drain, in seconds
    #[arg(short, long, default_value = "3600")]
    deadline_secs: u64,

    /// Print the final contents as pretty JSON
    #[arg(long)]
    pretty: bool,
}

impl From<&Args> for LibraryConfig {
    fn from(args: &Args) -> Self {
        LibraryConfig {
            readers: args.readers,
            writers: args.writers,
            read_interval: Duration::from_millis(args.read_interval_ms),
            write_pause: Duration::from_millis(args.write_pause_ms),
            deadline: Duration::from_secs(args.deadline_secs),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let args = Args::parse();
    let library = Library::new(LibraryConfig::from(&args)).context("invalid configuration")?;
    let collection = Arc::clone(library.collection());
    let report = library.start().context("failed to start workers")?;

    eprintln!("{}", report.termination);

    let snapshot = CollectionSnapshot::capture_now(&collection);
    let json = if args.pretty {
        snapshot.to_json_pretty()
    } else {
        snapshot.to_json()
    }
    .context("failed to serialize final snapshot")?;
    println!("{}", json);

    Ok(())
}
