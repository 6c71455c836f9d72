mod cluster;
mod cmd;
mod local;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kamel",
    about = "Reconcile Camel integrations, contexts and platforms from their manifests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Operator configuration file (default: nearest .kamel/config.yaml)
    #[arg(long, global = true, env = "KAMEL_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass over each manifest and save its status
    Reconcile {
        /// Workload manifests (Integration, IntegrationContext, IntegrationPlatform)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Server-side apply the generated resources to the current cluster
        #[arg(long)]
        apply: bool,

        /// Print the generated resources as YAML instead of the summary
        #[arg(long)]
        emit: bool,
    },

    /// Inspect the operator configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Reconcile { apply: true, .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = root::resolve_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Reconcile { files, apply, emit } => {
            cmd::reconcile::run(&config_path, &files, apply, emit, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&config_path, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
