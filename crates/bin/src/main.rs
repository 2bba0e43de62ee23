use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;
mod session;
mod templates;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedback=info")),
        )
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Info(args)) => commands::info::run(&args, format).await,
        Some(Commands::Users(args)) => commands::users::run(&args, format).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
