//! # docker-machine Listing Parser
//!
//! File: cli/src/common/machine/list.rs
//!
//! Parses the output of `docker-machine ls --format` (see [`LIST_FORMAT`])
//! into [`MachineDescriptor`]s. Descriptors are rebuilt on every query and
//! never cached.
//!
use tracing::warn;

/// Go template handed to `docker-machine ls --format`.
pub const LIST_FORMAT: &str = "{{.Name}};{{.DriverName}};{{.State}};{{.URL}}";

/// Coarse machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Stopped,
    /// The driver could not determine the state. Hyper-V reports this when
    /// the caller lacks administrator rights.
    Unknown,
}

impl MachineState {
    pub fn from_reported(state: &str) -> Self {
        match state.trim() {
            "Running" => MachineState::Running,
            // "Uknown" is how some docker-machine releases spell it.
            "" | "Unknown" | "Uknown" | "Error" | "Timeout" => MachineState::Unknown,
            _ => MachineState::Stopped,
        }
    }
}

/// One row of `docker-machine ls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineDescriptor {
    pub name: String,
    pub driver: String,
    pub state: MachineState,
    pub url: String,
}

/// Parses `ls` output produced with [`LIST_FORMAT`]. Rows that do not carry
/// at least a name, driver and state are skipped.
pub fn parse_listing(raw: &str) -> Vec<MachineDescriptor> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.splitn(4, ';').map(str::trim).collect();
            match fields.as_slice() {
                [name, driver, state, rest @ ..] if !name.is_empty() => Some(MachineDescriptor {
                    name: name.to_string(),
                    driver: driver.to_string(),
                    state: MachineState::from_reported(state),
                    url: rest.first().map(|u| u.to_string()).unwrap_or_default(),
                }),
                _ => {
                    warn!("Ignoring unrecognized docker-machine ls row: {}", line);
                    None
                }
            }
        })
        .collect()
}
