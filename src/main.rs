use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use note2action_lib::{AppConfig, AppError, AppResult};

#[derive(Parser)]
#[command(name = "note2action", version, about = "Turn unstructured notes into actionable tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web server (default)
    Serve {
        /// Listen address, overrides NOTE2ACTION_ADDR
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Find a model name the configured API key can use
    ProbeModels {
        /// Candidate model ids, tried in order
        models: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = note2action_lib::load_dotenv();
    note2action_lib::init_tracing();
    if let Err(err) = dotenv {
        tracing::warn!(error = %err, "Failed to load .env file");
    }
    let cli = Cli::parse();

    match execute(cli.command.unwrap_or(Command::Serve { addr: None })).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = err.kind(), error = %err, "note2action exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> AppResult<()> {
    let mut config = AppConfig::from_env()?;
    match command {
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                config.addr = addr;
            }
            note2action_lib::run(config).await
        }
        Command::ProbeModels { models } => {
            println!("Attempting to find a working model...\n");
            let outcomes = note2action_lib::probe(&config, &models).await?;
            for outcome in &outcomes {
                println!("{}\n", outcome.describe());
            }
            if outcomes.iter().any(|outcome| outcome.is_success()) {
                Ok(())
            } else {
                Err(AppError::AiService("no candidate model responded".to_string()))
            }
        }
    }
}
