use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use nairex::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display current exchange rates with their provenance
    Rates,
    /// Run a scripted trading session against a fresh in-memory ledger
    Demo {
        /// User id for the demo account
        #[arg(short, long, default_value = "demo")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Rates) => nairex::run_rates(cli.config_path.as_deref()).await,
        Some(Commands::Demo { user }) => {
            nairex::run_demo(&user, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
