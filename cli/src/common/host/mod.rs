//! # DockStation Engine Host Resolution (`common::host`)
//!
//! File: cli/src/common/host/mod.rs
//!
//! ## Overview
//!
//! Answers "which container engine does this test run use?". The answer is an
//! immutable `Endpoint`: a local socket, a named pipe, or a TCP address with an
//! optional client identity for mutual TLS.
//!
//! ## Architecture
//!
//! - **`endpoint`**: The `Endpoint` value and `DOCKER_HOST` parsing.
//! - **`resolver`**: The explicit host, native engine, docker-machine state machine.
//! - **`fixture`**: Once-per-process resolution and connection for test suites.
//!

pub mod endpoint;
pub mod fixture;
pub mod resolver;

pub use endpoint::{Endpoint, Transport};
pub use fixture::HostFixture;
pub use resolver::{EndpointResolver, ResolutionState};
