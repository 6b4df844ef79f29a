use clap::{Parser, Subcommand};
use pipeline_metrics_core::DashboardKind;
use tracing::error;

mod commands;
mod config;
mod errors;
mod logging;

use commands::config_cmd::ConfigCommands;
use commands::handle_event_cmd::HandleEventArgs;
use config::{get_config_path, AppConfig};
use errors::Error;
use logging::{init_logging, LogFormat};

/// Pipeline metrics CLI: derive delivery metrics from pipeline execution events
#[derive(Parser)]
#[command(name = "pipeline-metrics")]
#[command(about = "Derive delivery metrics from pipeline execution events", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one execution state-change event
    HandleEvent(HandleEventArgs),

    /// Publish the summary dashboard
    GenerateDashboard,

    /// Publish the trend dashboard
    GenerateDashboardTrend,

    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show the CLI version
    Version,
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let load_config = || AppConfig::load(&get_config_path(cli.config.as_deref()));

    match &cli.command {
        Commands::HandleEvent(args) => {
            let config = load_config()?;
            commands::handle_event_cmd::execute(&config, args).await
        }
        Commands::GenerateDashboard => {
            let config = load_config()?;
            commands::dashboard_cmd::execute(&config, DashboardKind::Summary).await
        }
        Commands::GenerateDashboardTrend => {
            let config = load_config()?;
            commands::dashboard_cmd::execute(&config, DashboardKind::Trend).await
        }
        Commands::Config(cmd) => commands::config_cmd::execute(cmd),
        Commands::Version => {
            println!(
                "pipeline-metrics version {}",
                option_env!("PIPELINE_METRICS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(LogFormat::from_json_flag(cli.json));

    if let Err(e) = run(&cli).await {
        error!("Error: {e}");
        std::process::exit(1);
    }
}
