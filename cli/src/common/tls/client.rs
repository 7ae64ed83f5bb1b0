//! # Engine TLS Client Configuration
//!
//! File: cli/src/common/tls/client.rs
//!
//! ## Overview
//!
//! Turns a [`CredentialBundle`] into the `rustls::ClientConfig` used for
//! engine connections. The bundle's identity file is always presented as the
//! client certificate. How the engine's certificate is checked depends on the
//! bundle:
//!
//! - With a trust anchor, the engine chain must verify against that CA and
//!   nothing else.
//! - Without one, [`AcceptEngineCertificate`] accepts whatever certificate the
//!   engine presents. docker-machine VMs serve a self-signed certificate, so
//!   there is no chain to verify. Handshake signatures are still checked
//!   against the presented certificate.
//!
use super::CredentialBundle;
use crate::common::fs::io::read_file;
use crate::core::error::Result;
use anyhow::{anyhow, bail, Context};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::sync::Arc;
use tracing::{debug, warn};

/// Accepts any engine certificate, verifying only handshake signatures.
#[derive(Debug)]
pub struct AcceptEngineCertificate {
    provider: Arc<CryptoProvider>,
}

impl AcceptEngineCertificate {
    pub fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for AcceptEngineCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Builds the client configuration for a mutual-TLS engine connection.
///
/// # Errors
///
/// Returns an `Err` if the identity file or trust anchor cannot be read or
/// parsed, or if rustls rejects the client key.
pub fn client_config(bundle: &CredentialBundle) -> Result<ClientConfig> {
    let provider = Arc::new(ring::default_provider());

    let identity = read_file(&bundle.bundle_path)?;
    let chain = rustls_pemfile::certs(&mut &identity[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Malformed certificate in {:?}", bundle.bundle_path))?;
    let key = rustls_pemfile::private_key(&mut &identity[..])
        .with_context(|| format!("Malformed private key in {:?}", bundle.bundle_path))?
        .ok_or_else(|| anyhow!("No private key found in {:?}", bundle.bundle_path))?;

    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .context("No TLS protocol versions available")?;

    let builder = match &bundle.trust_anchor {
        Some(ca_file) => {
            let mut roots = RootCertStore::empty();
            let ca_pem = read_file(ca_file)?;
            for certificate in rustls_pemfile::certs(&mut &ca_pem[..]) {
                let certificate =
                    certificate.with_context(|| format!("Malformed certificate in {:?}", ca_file))?;
                roots
                    .add(certificate)
                    .with_context(|| format!("Unusable trust anchor in {:?}", ca_file))?;
            }
            if roots.is_empty() {
                bail!("No certificate found in trust anchor {:?}", ca_file);
            }
            debug!("Verifying engine certificates against {}", ca_file.display());
            builder.with_root_certificates(roots)
        }
        None => {
            warn!("No trust anchor for the engine; accepting its certificate as presented");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptEngineCertificate::new(provider)))
        }
    };

    builder
        .with_client_auth_cert(chain, key)
        .context("Client certificate rejected")
}
