//! Trellis CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Code topology engine: dependency health metrics and edit validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the dependency topology of an extracted symbol graph
    Analyze {
        /// Extraction JSON ({"symbols": [...], "edges": [...]})
        graph: PathBuf,

        /// Layer configuration file (TOML or JSON)
        #[arg(short, long)]
        layers: Option<PathBuf>,
    },
    /// Assemble a bounded neighborhood around seed symbols
    Assemble {
        /// Extraction JSON ({"symbols": [...], "edges": [...]})
        graph: PathBuf,

        /// Seed symbol ids or bare symbol names
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Maximum traversal distance from the seeds
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Minimum edge strength to follow
        #[arg(short = 't', long, default_value = "0.0")]
        threshold: f32,

        /// Layer configuration file (TOML or JSON)
        #[arg(short, long)]
        layers: Option<PathBuf>,

        /// Issue id to stamp into the neighborhood metadata
        #[arg(long)]
        issue: Option<String>,

        /// Fill symbol code from source files under this root
        #[arg(long, value_name = "ROOT")]
        hydrate: Option<PathBuf>,
    },
    /// Virtually apply candidate edits and report red flags
    Validate {
        /// Extraction JSON ({"symbols": [...], "edges": [...]})
        graph: PathBuf,

        /// Candidate edits JSON (array of edits)
        edits: PathBuf,

        /// Layer configuration file (TOML or JSON)
        #[arg(short, long)]
        layers: Option<PathBuf>,

        /// Betti baseline tracked by the caller across generations
        #[arg(long)]
        previous_betti: Option<usize>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "trellis={0},trellis_core={0},trellis_hydrate={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze { graph, layers } => commands::analyze(&graph, layers.as_deref()),
        Commands::Assemble {
            graph,
            seeds,
            depth,
            threshold,
            layers,
            issue,
            hydrate,
        } => commands::assemble(
            &graph,
            &seeds,
            depth,
            threshold,
            layers.as_deref(),
            issue.as_deref(),
            hydrate.as_deref(),
        ),
        Commands::Validate {
            graph,
            edits,
            layers,
            previous_betti,
        } => {
            let safe = commands::validate(&graph, &edits, layers.as_deref(), previous_betti)?;
            if !safe {
                // red flag: shell-level orchestration gates on the exit code
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Version => {
            println!("trellis v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
