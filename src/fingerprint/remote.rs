// Fingerprint of the certificate a BMC presents

use super::Fingerprint;
use crate::error::SyncError;
use rustls::ClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Fingerprint the leaf certificate presented by `host:port`
///
/// The presented chain is not verified: BMCs use self-signed or internal-CA
/// certificates, and the presented certificate is what is being compared, not
/// a peer being authenticated. `timeout` bounds connect and handshake together.
pub async fn fingerprint_remote(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<Fingerprint, SyncError> {
    match tokio::time::timeout(timeout, handshake(host, port)).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::DialTimeout {
            host: host.to_string(),
            timeout,
        }),
    }
}

async fn handshake(host: &str, port: u16) -> Result<Fingerprint, SyncError> {
    let config = client_config().map_err(|e| SyncError::dial(host, e))?;
    let connector = TlsConnector::from(Arc::new(config));

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| SyncError::dial(host, format!("invalid server name: {}", e)))?;

    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| SyncError::dial(host, e))?;

    let tls_stream = connector
        .connect(server_name, stream)
        .await
        .map_err(|e| SyncError::dial(host, e))?;

    let (_io, connection) = tls_stream.get_ref();
    let leaf = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| SyncError::NoCertificate {
            host: host.to_string(),
        })?;

    Ok(Fingerprint::from_der(leaf.as_ref()))
}

fn client_config() -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
        .with_no_client_auth())
}

/// Accepts whatever certificate the BMC presents
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
