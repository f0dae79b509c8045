// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tinta_cli::commands::{import, inspect, suggest};
use tinta_kernel::config::DEFAULT_SUGGESTION_LIMIT;
use tinta_kernel::dist::ColorMetric;

#[derive(Parser)]
#[command(name = "tinta")]
#[command(about = "Tinta Catalog CLI - offline tools for the product store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a node would load from a store document
    Inspect {
        /// Path to the store document
        store: PathBuf,
    },
    /// Import a `;`-delimited product CSV into a store document
    Import {
        csv: PathBuf,

        /// Store document to update (created if missing)
        #[arg(long, short)]
        store: PathBuf,
    },
    /// List the products closest in color to one product
    Suggest {
        store: PathBuf,
        id: String,

        #[arg(long, short, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,

        /// rgb or cie76
        #[arg(long, short, default_value_t = ColorMetric::default())]
        metric: ColorMetric,

        /// Print the suggestions as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { store } => inspect::run(&store),
        Commands::Import { csv, store } => import::run(&csv, &store).map(|_| ()),
        Commands::Suggest {
            store,
            id,
            limit,
            metric,
            json,
        } => suggest::run(&store, &id, limit, metric, json).map(|_| ()),
    }
}
