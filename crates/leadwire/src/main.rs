// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadwire - WhatsApp lead-capture front-end.
//!
//! This is the binary entry point: the dialogue bot (`serve`), the
//! outreach sender (`broadcast`) and the lead listing (`leads`).

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod broadcast;
mod leads;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Leadwire - WhatsApp lead-capture front-end.
#[derive(Parser, Debug)]
#[command(name = "leadwire", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dialogue bot until SIGINT or SIGTERM (default).
    Serve,
    /// Send a randomized outreach message to every phone in a CSV file.
    Broadcast {
        /// CSV file with a header row.
        csv: PathBuf,
        /// Column holding the phone numbers (defaults to `broadcast.phone_column`).
        #[arg(long)]
        column: Option<String>,
        /// Print the messages without sending or pausing.
        #[arg(long)]
        dry_run: bool,
        /// Keep the file order instead of shuffling.
        #[arg(long)]
        no_shuffle: bool,
    },
    /// List the most recent captured leads.
    Leads {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print JSON lines instead of a text listing.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => leadwire_config::load_and_validate_path(path),
        None => leadwire_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadwire_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Broadcast {
            csv,
            column,
            dry_run,
            no_shuffle,
        } => {
            let options = broadcast::BroadcastOptions {
                csv,
                column,
                dry_run,
                shuffle: !no_shuffle,
            };
            broadcast::run_broadcast(&config, options).await
        }
        Commands::Leads { limit, json } => leads::run_leads(&config, limit, json).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
