mod app;
mod config_commands;
mod modal_commands;
mod trigger_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::app::App;

#[derive(Parser)]
#[command(
    name = "configurator",
    about = "Keeps a workflow's event trigger and the bot's channel memberships in sync"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./configurator.toml and friends).
    #[arg(long, global = true, env = "CONFIGURATOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Point the trigger at exactly these channels and join them all.
    Configure {
        /// Channel id; repeat for several.
        #[arg(long = "channel", required = true)]
        channels: Vec<String>,
        /// Workflow callback id (defaults to `trigger.workflow`).
        #[arg(long)]
        workflow: Option<String>,
    },
    /// Show the trigger currently managed for a workflow.
    Status {
        #[arg(long)]
        workflow: Option<String>,
    },
    /// Two-phase configuration through a channel-picker modal.
    Modal {
        #[command(subcommand)]
        action: modal_commands::ModalAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so `modal submit` output stays machine-readable.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "configurator starting");

    let config = configurator_config::load_or_discover(cli.config.as_deref())?;

    if let Commands::Config { action } = cli.command {
        return config_commands::handle_config(action, &config);
    }

    config_commands::ensure_usable(&config)?;
    let app = App::from_config(&config)?;

    match cli.command {
        Commands::Configure { channels, workflow } => {
            trigger_commands::configure(&app, channels, workflow).await
        },
        Commands::Status { workflow } => trigger_commands::status(&app, workflow).await,
        Commands::Modal { action } => modal_commands::handle_modal(action, &app).await,
        Commands::Config { .. } => Ok(()),
    }
}
