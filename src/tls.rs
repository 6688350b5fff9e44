//! rustls configuration for https:// endpoints

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::error::{Error, Result};

/// Parse a hex fingerprint string (with or without colons) into 32 bytes.
pub(crate) fn parse_fingerprint(s: &str) -> Result<[u8; 32]> {
    let hex_str: String = s.chars().filter(|c| *c != ':').collect();
    let bytes = hex::decode(&hex_str)
        .map_err(|e| Error::Tls(format!("Invalid SSL fingerprint hex: {}", e)))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        Error::Tls(format!(
            "SSL fingerprint must be 32 bytes (SHA-256), got {} bytes",
            b.len()
        ))
    })
}

/// Verifier used instead of CA validation.
///
/// With a pinned fingerprint only that exact leaf certificate is accepted;
/// without one every certificate is. Handshake signatures are still checked
/// in both cases.
struct RelaxedVerifier {
    pinned: Option<[u8; 32]>,
    provider: Arc<CryptoProvider>,
}

impl fmt::Debug for RelaxedVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaxedVerifier")
            .field("pinned", &self.pinned.map(hex::encode))
            .finish()
    }
}

impl ServerCertVerifier for RelaxedVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let Some(expected) = &self.pinned else {
            return Ok(ServerCertVerified::assertion());
        };
        let actual = ring::digest::digest(&ring::digest::SHA256, end_entity.as_ref());
        if actual.as_ref() == expected {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::General(format!(
                "Certificate fingerprint mismatch: expected {}, got {}",
                hex::encode(expected),
                hex::encode(actual.as_ref())
            )))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
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
        rustls::crypto::verify_tls13_signature(
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

/// Build the rustls client config.
///
/// Priority: fingerprint pinning, then `reject_unauthorized = false`, then
/// standard webpki roots.
pub(crate) fn build_tls_config(
    ssl_fingerprint: Option<&str>,
    reject_unauthorized: bool,
) -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(e.to_string()))?;

    let pinned = ssl_fingerprint.map(parse_fingerprint).transpose()?;
    if pinned.is_none() && reject_unauthorized {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        return Ok(builder.with_root_certificates(roots).with_no_client_auth());
    }

    let verifier = Arc::new(RelaxedVerifier { pinned, provider });
    Ok(builder
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth())
}
