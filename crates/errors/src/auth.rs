//! Client certificate and key material error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("certificate not readable: {path}: {message}")]
    CertificateUnreadable { path: String, message: String },

    #[error("invalid client certificate {path}: {message}")]
    InvalidCertificate { path: String, message: String },

    #[error("key file not found: {path}")]
    KeysNotFound { path: String },
}

impl UserFacingError for AuthError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CertificateUnreadable { .. } => Some("Check the --cert path and its permissions."),
            Self::InvalidCertificate { .. } => {
                Some("Provide a PKCS#12 (.pfx) certificate and the matching --cert-password.")
            }
            Self::KeysNotFound { .. } => Some("Check the --keys path."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CertificateUnreadable { .. } => "auth.certificate_unreadable",
            Self::InvalidCertificate { .. } => "auth.invalid_certificate",
            Self::KeysNotFound { .. } => "auth.keys_not_found",
        };
        Some(code)
    }
}
