//! # DockStation Run Command
//!
//! File: cli/src/commands/container/run.rs
//!
//! ## Overview
//!
//! Implements `dockstation run`: creates a named container with published
//! ports, replacing any container of the same name, and leaves it running.
//! The container is created with auto-remove, so the engine deletes it once
//! it exits; `dockstation rm` removes it earlier.
//!
//! ## Usage
//!
//! ```bash
//! dockstation run --name httpEcho --port 5678 --image hashicorp/http-echo -- -text=Hello
//! ```
//!
//! Prints the container id followed by one `host:port` line per published port.
//!
use clap::Parser;
use dockstation::common::docker::ContainerHandle;
use dockstation::core::error::Result;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Create and start a container, replacing any container of the same name")]
pub struct RunArgs {
    /// Container name.
    #[arg(long)]
    name: String,

    /// Container port to publish on the same host port. Repeatable.
    #[arg(long = "port", short = 'p', required = true, num_args = 1..)]
    ports: Vec<u16>,

    /// Image to run; `:latest` is assumed when no tag is given.
    #[arg(long)]
    image: String,

    /// Arguments passed to the container's entrypoint.
    #[arg(last = true)]
    args: Vec<String>,
}

pub async fn handle_run(args: RunArgs) -> Result<()> {
    info!(
        "Handling run command (Name: {}, Image: {}, Ports: {:?})",
        args.name, args.image, args.ports
    );
    let fixture = super::fixture()?;
    let handle = fixture
        .factory()
        .await?
        .create_container(&args.name, &args.ports, &args.image, &args.args)
        .await?;
    println!("{}", describe(&handle));
    handle.detach();
    Ok(())
}

fn describe(handle: &ContainerHandle) -> String {
    let mut lines = vec![handle.id().to_string()];
    lines.extend(
        handle
            .exposed_ports()
            .iter()
            .map(|port| format!("{}:{}", handle.host(), port)),
    );
    lines.join("\n")
}
