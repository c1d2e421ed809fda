mod cli;
mod commands;
mod formatting;

use std::process::ExitCode;

use cli::Commands;
use commands::run_tracking;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Run {
            manifest,
            retry_limit,
            soft_assert,
            format,
            output,
        } => {
            run_tracking(
                args.config,
                manifest,
                retry_limit,
                soft_assert,
                format,
                output,
            )
            .await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
