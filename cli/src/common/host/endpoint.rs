//! # Engine Endpoint Model
//!
//! File: cli/src/common/host/endpoint.rs
//!
//! An [`Endpoint`] is the resolved answer to "where is the container engine":
//! a transport, an address, and (for TCP engines provisioned by
//! docker-machine) the mutual-TLS identity to present.
//!
//! | Host string                        | Transport     | Address                        |
//! |------------------------------------|---------------|--------------------------------|
//! | `unix:///var/run/docker.sock`      | `LocalSocket` | `/var/run/docker.sock`         |
//! | `npipe:////./pipe/docker_engine`   | `NamedPipe`   | `\\.\pipe\docker_engine`       |
//! | `tcp://10.0.0.2:2376`              | `Tcp`         | `tcp://10.0.0.2:2376`          |
//! | `http://…` / `https://…`           | `Tcp`         | `tcp://host:port`              |
//!
use crate::common::tls::CredentialBundle;
use crate::core::error::{DockStationError, Result};
use anyhow::anyhow;
use std::fmt;

const PIPE_PREFIX: &str = r"\\.\pipe\";

/// How the engine is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Unix domain socket on this host.
    LocalSocket,
    /// TCP, optionally with mutual TLS.
    Tcp,
    /// Windows named pipe on this host.
    NamedPipe,
}

/// A resolved engine endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub transport: Transport,
    /// Socket path, pipe path, or `tcp://host:port`.
    pub address: String,
    /// Client identity; only ever present on `Tcp` endpoints.
    pub tls: Option<CredentialBundle>,
}

impl Endpoint {
    /// Endpoint for a native socket or pipe path such as `/var/run/docker.sock`
    /// or `\\.\pipe\docker_engine`.
    pub fn native(path: &str) -> Self {
        let pipe_form = path.replace('/', "\\");
        if pipe_form.starts_with(PIPE_PREFIX) {
            Self {
                transport: Transport::NamedPipe,
                address: pipe_form,
                tls: None,
            }
        } else {
            Self {
                transport: Transport::LocalSocket,
                address: path.to_string(),
                tls: None,
            }
        }
    }

    /// Parses an explicit engine host (`DOCKER_HOST` syntax). The result has
    /// no TLS; see [`Endpoint::with_tls`].
    ///
    /// # Errors
    ///
    /// `DockStationError::InvalidArgument` for unknown schemes or a missing address.
    pub fn from_host(host: &str) -> Result<Self> {
        let host = host.trim();
        let invalid = |reason: &str| {
            anyhow!(DockStationError::InvalidArgument(format!(
                "Engine host '{}' {}",
                host, reason
            )))
        };
        let (scheme, rest) = host
            .split_once("://")
            .ok_or_else(|| invalid("has no scheme"))?;
        if rest.is_empty() {
            return Err(invalid("has no address"));
        }

        match scheme.to_ascii_lowercase().as_str() {
            "unix" => Ok(Self {
                transport: Transport::LocalSocket,
                address: rest.to_string(),
                tls: None,
            }),
            "npipe" => Ok(Self {
                transport: Transport::NamedPipe,
                address: format!(r"\\{}", rest.trim_start_matches('/').replace('/', "\\")),
                tls: None,
            }),
            "tcp" | "http" | "https" => {
                let authority = rest.split('/').next().unwrap_or_default();
                if authority.is_empty() {
                    return Err(invalid("has no address"));
                }
                Ok(Self {
                    transport: Transport::Tcp,
                    address: format!("tcp://{}", authority),
                    tls: None,
                })
            }
            _ => Err(invalid("uses an unsupported scheme")),
        }
    }

    /// Attaches a client identity.
    ///
    /// # Errors
    ///
    /// `DockStationError::InvalidArgument` unless the transport is `Tcp`.
    pub fn with_tls(mut self, bundle: CredentialBundle) -> Result<Self> {
        if self.transport != Transport::Tcp {
            return Err(anyhow!(DockStationError::InvalidArgument(format!(
                "TLS is only supported over TCP, not {:?} ({})",
                self.transport, self.address
            ))));
        }
        self.tls = Some(bundle);
        Ok(self)
    }

    /// Host name tests use to reach ports published by containers on this engine.
    pub fn service_host(&self) -> String {
        match self.transport {
            Transport::LocalSocket | Transport::NamedPipe => "localhost".to_string(),
            Transport::Tcp => {
                let authority = self.address.trim_start_matches("tcp://");
                split_host(authority).to_string()
            }
        }
    }

    /// `DOCKER_HOST`-style rendering of the endpoint.
    pub fn uri(&self) -> String {
        match self.transport {
            Transport::LocalSocket => format!("unix://{}", self.address),
            Transport::NamedPipe => format!("npipe://{}", self.address.replace('\\', "/")),
            Transport::Tcp => self.address.clone(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())?;
        if self.tls.is_some() {
            write!(f, " (mutual TLS)")?;
        }
        Ok(())
    }
}

/// Host part of `host:port`, `[v6]:port` or a bare host.
fn split_host(authority: &str) -> &str {
    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match authority.rsplit_once(':') {
        Some((host, _port)) => host,
        None => authority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn bundle() -> CredentialBundle {
        CredentialBundle {
            certificate: PathBuf::from("/certs/cert.pem"),
            private_key: PathBuf::from("/certs/key.pem"),
            bundle_path: PathBuf::from("/certs/key.bundle.pem"),
            trust_anchor: Some(PathBuf::from("/certs/ca.pem")),
        }
    }

    #[test]
    fn test_from_host_schemes() {
        let unix = Endpoint::from_host("unix:///var/run/docker.sock").unwrap();
        assert_eq!(unix.transport, Transport::LocalSocket);
        assert_eq!(unix.address, "/var/run/docker.sock");

        let pipe = Endpoint::from_host("npipe:////./pipe/docker_engine").unwrap();
        assert_eq!(pipe.transport, Transport::NamedPipe);
        assert_eq!(pipe.address, r"\\.\pipe\docker_engine");

        let tcp = Endpoint::from_host("tcp://192.168.99.100:2376").unwrap();
        assert_eq!(tcp.transport, Transport::Tcp);
        assert_eq!(tcp.address, "tcp://192.168.99.100:2376");

        let https = Endpoint::from_host("https://engine.internal:2376/").unwrap();
        assert_eq!(https.address, "tcp://engine.internal:2376");
    }

    #[test]
    fn test_from_host_rejects_unknown_input() {
        for host in ["ssh://user@box", "/var/run/docker.sock", "tcp://", "unix://"] {
            let err = Endpoint::from_host(host).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<DockStationError>(),
                    Some(DockStationError::InvalidArgument(_))
                ),
                "{} should be rejected",
                host
            );
        }
    }

    #[test]
    fn test_native_paths() {
        assert_eq!(
            Endpoint::native("/var/run/docker.sock").transport,
            Transport::LocalSocket
        );
        let pipe = Endpoint::native(r"\\.\pipe\docker_engine");
        assert_eq!(pipe.transport, Transport::NamedPipe);
        assert_eq!(pipe.uri(), "npipe:////./pipe/docker_engine");
    }

    #[test]
    fn test_service_host() {
        assert_eq!(
            Endpoint::native("/var/run/docker.sock").service_host(),
            "localhost"
        );
        assert_eq!(
            Endpoint::native(r"\\.\pipe\docker_engine").service_host(),
            "localhost"
        );
        assert_eq!(
            Endpoint::from_host("tcp://172.17.141.98:2376")
                .unwrap()
                .service_host(),
            "172.17.141.98"
        );
        assert_eq!(
            Endpoint::from_host("tcp://[fe80::1]:2376")
                .unwrap()
                .service_host(),
            "fe80::1"
        );
    }

    #[test]
    fn test_tls_only_on_tcp() {
        let tcp = Endpoint::from_host("tcp://10.0.0.2:2376")
            .unwrap()
            .with_tls(bundle())
            .unwrap();
        assert!(tcp.tls.is_some());
        assert_eq!(tcp.to_string(), "tcp://10.0.0.2:2376 (mutual TLS)");

        assert!(Endpoint::native("/var/run/docker.sock")
            .with_tls(bundle())
            .is_err());
    }
}
