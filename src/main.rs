use anyhow::Result;
use clap::Parser;
use replay_debugger::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();
    let config_path = cli.config.clone();

    // Logs go to stderr so `--output json` keeps stdout clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve(args) => {
            replay_debugger::cli::commands::serve(args, verbosity, config_path.as_deref())?;
        }
        Commands::Run(args) => {
            replay_debugger::cli::commands::run(args, verbosity, config_path.as_deref())?;
        }
        Commands::Inspect(args) => {
            replay_debugger::cli::commands::inspect(args, verbosity, config_path.as_deref())?;
        }
    }

    Ok(())
}
