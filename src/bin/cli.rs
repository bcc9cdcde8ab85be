//! ShardLog CLI
//!
//! Command-line interface for inspecting and editing a ShardLog table.

use clap::{Parser, Subcommand, ValueEnum};
use shardlog::{Config, RowTable, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// ShardLog CLI
#[derive(Parser, Debug)]
#[command(name = "shardlog-cli")]
#[command(about = "CLI for ShardLog per-key row logs")]
#[command(version)]
struct Args {
    /// Shard root directory
    #[arg(short, long, default_value = "./shardlog_data")]
    root: String,

    /// Shard prefix length
    #[arg(short, long, default_value = "2")]
    cutoff: usize,

    /// Row width in bytes
    #[arg(short = 'w', long, default_value = "32")]
    row_width: usize,

    /// When to fsync after a mutation
    #[arg(long, value_enum, default_value = "never")]
    sync: SyncArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a row
    Insert {
        /// The key to append to
        key: String,

        /// The row (must be exactly row-width bytes)
        row: String,
    },

    /// Append a row unless it is already present
    InsertUnique {
        /// The key to append to
        key: String,

        /// The row (must be exactly row-width bytes)
        row: String,
    },

    /// Delete the first matching row
    Delete {
        /// The key to delete from
        key: String,

        /// The row to delete
        row: String,
    },

    /// Print the most recent rows, latest first
    Index {
        /// The key to list
        key: String,

        /// Number of rows (0 = all)
        #[arg(short, default_value = "0")]
        n: u64,
    },

    /// Print the number of rows for a key
    Count {
        /// The key to count
        key: String,
    },

    /// Remove a key's file
    Remove {
        /// The key to remove
        key: String,
    },

    /// Remove the whole shard tree
    Purge,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SyncArg {
    Never,
    Every,
}

impl From<SyncArg> for SyncStrategy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::Never => SyncStrategy::Never,
            SyncArg::Every => SyncStrategy::EveryMutation,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shardlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("ShardLog CLI v{}", shardlog::VERSION);

    let config = Config::builder()
        .root(&args.root)
        .cutoff(args.cutoff)
        .row_width(args.row_width)
        .sync(args.sync.into())
        .build();

    let table = match RowTable::open(config) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to open table: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&table, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(table: &RowTable, command: Commands) -> shardlog::Result<()> {
    match command {
        Commands::Insert { key, row } => table.insert(&key, row.as_bytes()),
        Commands::InsertUnique { key, row } => table.insert_unique(&key, row.as_bytes()),
        Commands::Delete { key, row } => table.delete(&key, row.as_bytes()),
        Commands::Index { key, n } => {
            for row in table.index_n(&key, n)? {
                println!("{}", String::from_utf8_lossy(&row));
            }
            Ok(())
        }
        Commands::Count { key } => {
            println!("{}", table.row_count(&key)?);
            Ok(())
        }
        Commands::Remove { key } => table.store().remove(&key),
        Commands::Purge => {
            tracing::info!("Removing {}", table.store().root().display());
            table.store().remove_all()
        }
    }
}
