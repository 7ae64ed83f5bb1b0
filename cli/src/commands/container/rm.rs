//! # DockStation Remove Command
//!
//! File: cli/src/commands/container/rm.rs
//!
//! ## Overview
//!
//! Implements `dockstation rm`: stops and removes containers by name or id.
//! Containers that are already gone count as removed, so the command can be
//! repeated safely. Every name is attempted even if an earlier one fails.
//!
//! ## Usage
//!
//! ```bash
//! dockstation rm httpEcho
//! dockstation rm web cache
//! ```
//!
use anyhow::Context;
use clap::Parser;
use dockstation::core::error::Result;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Stop and remove containers; absent containers are not an error")]
pub struct RmArgs {
    /// Names or ids of the containers to remove.
    #[arg(required = true, num_args = 1..)]
    names: Vec<String>,
}

pub async fn handle_rm(args: RmArgs) -> Result<()> {
    info!("Handling rm command (Names: {:?})", args.names);
    let fixture = super::fixture()?;
    let factory = fixture.factory().await?;

    let mut failed_removals = Vec::new();
    for name in &args.names {
        match factory.remove_container(name).await {
            Ok(()) => println!("Removed container '{}'", name),
            Err(e) => {
                error!("Failed to remove container '{}': {:?}", name, e);
                failed_removals.push((name.clone(), e));
            }
        }
    }

    if failed_removals.is_empty() {
        return Ok(());
    }
    eprintln!("Errors occurred during container removal:");
    for (name, err) in &failed_removals {
        eprintln!("- {}: {}", name, err);
    }
    let failures = failed_removals.len();
    let (_, first_error) = failed_removals.remove(0);
    Err(first_error).context(format!("Failed to remove {} container(s)", failures))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_multiple_names() {
        let args = RmArgs::try_parse_from(["rm", "web", "cache"]).unwrap();
        assert_eq!(args.names, vec!["web", "cache"]);
    }

    #[test]
    fn test_requires_a_name() {
        assert!(RmArgs::try_parse_from(["rm"]).is_err());
    }
}
