use afterhours::cli::run::RunOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "afterhours")]
#[command(about = "After-hours fleet usage report", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch yesterday's after-hours report and email it
    Run {
        /// Print the report without sending email
        #[arg(long)]
        no_email: bool,

        /// Also write the rendered HTML to this file
        #[arg(long)]
        html_out: Option<PathBuf>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "afterhours=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = afterhours::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run { no_email, html_out }) => {
            afterhours::cli::run::run(config_path, RunOptions { no_email, html_out }).await?;
        }
        None => {
            afterhours::cli::run::run(config_path, RunOptions::default()).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                afterhours::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                afterhours::cli::config::validate(config_path)?;
            }
        },
    }

    Ok(())
}
