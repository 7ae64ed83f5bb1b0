//! # DockStation Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `dockstation` binary, a thin command-line front end to
//! the library. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up logging based on verbosity flags
//! - Routing execution to the command handlers in `commands::`
//!
//! ## Examples
//!
//! ```bash
//! # Where would tests run?
//! dockstation endpoint
//!
//! # Start an echo server for manual testing, with debug logs
//! dockstation -vv run --name httpEcho --port 5678 --image hashicorp/http-echo -- -text=Hello
//!
//! # Clean it up again
//! dockstation rm httpEcho
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging from `-v` count, unless `RUST_LOG` is set
//! 3. Route to the command handler
//! 4. Print any error as `Error: ...` and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "dockstation",
    about = "Container engine endpoints and throwaway containers for integration tests",
    long_about = "Resolves a container engine (explicit DOCKER_HOST, native socket, or a \
                  docker-machine VM provisioned on demand) and manages named test containers on it.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "e")]
    Endpoint(commands::endpoint::EndpointArgs),
    Run(commands::container::run::RunArgs),
    Rm(commands::container::rm::RmArgs),
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Endpoint(args) => commands::endpoint::handle_endpoint(args).await,
        Commands::Run(args) => commands::container::run::handle_run(args).await,
        Commands::Rm(args) => commands::container::rm::handle_rm(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
