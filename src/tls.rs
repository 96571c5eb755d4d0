//! Certificate validation policy

use std::sync::Arc;
use std::time::SystemTime;

use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ServerName};
use sha2::{Digest, Sha256};

/// How the client validates the server certificate.
///
/// Derived from [`ClientConfig`](crate::ClientConfig): ignoring certificate
/// errors takes precedence, then a pinned thumbprint, then platform
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificatePolicy {
    /// Platform validation against the system trust roots
    Default,
    /// Every certificate is considered valid
    IgnoreErrors,
    /// Valid only when the certificate's SHA-256 thumbprint matches
    /// (case-insensitive hex)
    Pinned(String),
}

impl CertificatePolicy {
    /// The validator this policy resolves to, or `None` for platform
    /// validation.
    pub fn validator(&self) -> Option<ThumbprintValidator> {
        match self {
            Self::Default => None,
            Self::IgnoreErrors => Some(ThumbprintValidator { pinned: None }),
            Self::Pinned(thumbprint) => Some(ThumbprintValidator {
                pinned: Some(thumbprint.clone()),
            }),
        }
    }
}

/// Decides whether a presented certificate thumbprint is acceptable.
#[derive(Debug, Clone)]
pub struct ThumbprintValidator {
    // None accepts everything
    pinned: Option<String>,
}

impl ThumbprintValidator {
    /// Whether a certificate with the given thumbprint is acceptable
    pub fn validate(&self, thumbprint: &str) -> bool {
        match &self.pinned {
            Some(pinned) => pinned.eq_ignore_ascii_case(thumbprint),
            None => true,
        }
    }

    /// Whether a certificate in DER form is acceptable
    pub fn validate_der(&self, der: &[u8]) -> bool {
        self.validate(&thumbprint(der))
    }
}

/// Upper-hex SHA-256 thumbprint of a DER-encoded certificate
pub fn thumbprint(der: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(der))
}

/// rustls verifier that accepts exactly the pinned certificate, replacing
/// chain and hostname validation the way an explicit pin does.
pub(crate) struct PinnedCertificateVerifier {
    validator: ThumbprintValidator,
}

impl PinnedCertificateVerifier {
    pub(crate) fn new(validator: ThumbprintValidator) -> Self {
        Self { validator }
    }
}

impl ServerCertVerifier for PinnedCertificateVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        if self.validator.validate_der(&end_entity.0) {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::InvalidCertificate(
                rustls::CertificateError::ApplicationVerificationFailure,
            ))
        }
    }
}

/// rustls client config that routes certificate validation through the pin
pub(crate) fn pinned_tls_config(validator: ThumbprintValidator) -> rustls::ClientConfig {
    rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(PinnedCertificateVerifier::new(validator)))
        .with_no_client_auth()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_errors_accepts_arbitrary_thumbprints() {
        let validator = CertificatePolicy::IgnoreErrors.validator().unwrap();
        assert!(validator.validate("ANYTHING"));
        assert!(validator.validate(""));
        assert!(validator.validate_der(b"not even a certificate"));
    }

    #[test]
    fn test_pinned_matches_case_insensitively() {
        let validator = CertificatePolicy::Pinned("aa11bb22".into()).validator().unwrap();
        assert!(validator.validate("aa11bb22"));
        assert!(validator.validate("AA11BB22"));
        assert!(validator.validate("Aa11Bb22"));
        assert!(!validator.validate("aa11bb23"));
        assert!(!validator.validate(""));
    }

    #[test]
    fn test_default_policy_has_no_validator() {
        assert!(CertificatePolicy::Default.validator().is_none());
    }

    #[test]
    fn test_der_thumbprint_round_trip() {
        let der = b"certificate bytes";
        let printed = thumbprint(der);
        let validator = CertificatePolicy::Pinned(printed.to_lowercase())
            .validator()
            .unwrap();
        assert!(validator.validate_der(der));
        assert!(!validator.validate_der(b"different bytes"));
    }
}
