use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qcomm_execution::{TelemetryOptions, init_tracing};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "qcomm")]
#[command(about = "QComm - simulated resonance link dashboard", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed every random source for a reproducible run
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print results and logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the connection and stability state machines by hand
    Simulate {
        /// Number of ticks to apply to each state machine
        #[arg(long, default_value_t = 10)]
        ticks: u32,

        /// Entity to connect to (defaults to the first configured entity)
        #[arg(long)]
        entity: Option<String>,

        /// Turn the stability boost on before ticking
        #[arg(long)]
        boost: bool,

        /// Engage emergency stabilization before ticking
        #[arg(long)]
        emergency: bool,
    },
    /// Run the bounded repair loop against simulated diagnostics
    Repair,
    /// Send a message to an entity and route its simulated reply
    Chat {
        #[arg(long)]
        entity: String,

        #[arg(long)]
        message: String,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Target file (defaults to the platform config path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(TelemetryOptions {
        json: cli.json,
        default_filter: Some("warn".to_string()),
        events: None,
    })
    .context("Failed to initialise logging")?;

    let ctx = commands::Context {
        config_path: cli.config,
        seed: cli.seed,
        json: cli.json,
    };

    match cli.command {
        Commands::Simulate {
            ticks,
            entity,
            boost,
            emergency,
        } => {
            commands::simulate::run(
                &ctx,
                commands::simulate::SimulateArgs {
                    ticks,
                    entity,
                    boost,
                    emergency,
                },
            )
            .await?
        }
        Commands::Repair => commands::repair::run(&ctx).await?,
        Commands::Chat { entity, message } => commands::chat::run(&ctx, &entity, &message).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => commands::config::init(path.or(ctx.config_path))?,
        },
    }

    Ok(())
}
