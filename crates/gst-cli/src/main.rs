use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gst")]
#[command(about = "General Strategy data-entry CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

/// Flags shared by every command that starts from run settings.
#[derive(clap::Args, Debug, Clone)]
struct RunArgs {
    /// Settings YAML paths in merge order (base -> env -> local ...)
    #[arg(long = "settings", required = true)]
    settings_paths: Vec<String>,

    /// Override `execution_id` from settings
    #[arg(long)]
    execution_id: Option<String>,

    /// Override `store_root` from settings
    #[arg(long)]
    store_root: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered settings hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Load the scoped config for one execution and print it
    ShowConfig {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Register every declared security against the paper platform
    Register {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Fetch a custom feed's source and print its records as JSON lines
    Replay {
        #[command(flatten)]
        run: RunArgs,

        /// Registration id, e.g. garch_data_customdata_daily_usa
        #[arg(long)]
        feed: String,

        /// Print at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
        Commands::ShowConfig { run } => commands::show_config(&run),
        Commands::Register { run } => commands::register(&run),
        Commands::Replay { run, feed, limit } => commands::replay(&run, &feed, limit),
    }
}
