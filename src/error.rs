//! use selfcert::error::SelfCertError;

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SelfCertError>;

/// Pipeline stage at which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    KeyGeneration,
    DistinguishedName,
    Extensions,
    Assembly,
    Signing,
    Encoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::KeyGeneration => "key generation",
            Stage::DistinguishedName => "distinguished name",
            Stage::Extensions => "extensions",
            Stage::Assembly => "certificate assembly",
            Stage::Signing => "signing",
            Stage::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

/// Represents errors that can occur while issuing a self-signed identity.
///
/// Every variant is terminal for the current invocation. Use [`SelfCertError::stage`]
/// to find the failing stage and [`SelfCertError::is_configuration_error`] to decide
/// whether the caller can fix it by changing its input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelfCertError {
    /// The key pair could not be generated.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// A distinguished name attribute was empty or not encodable.
    #[error("Invalid attribute {attribute}: {reason}")]
    InvalidAttributeError { attribute: String, reason: String },

    /// An extension request was unknown, incomplete or malformed.
    #[error("Unsupported extension {kind}: {reason}")]
    UnsupportedExtensionError { kind: String, reason: String },

    /// A subject or issuer name had no attributes.
    #[error("The {field} name must contain at least one attribute")]
    EmptyNameError { field: &'static str },

    /// The validity window is inverted or out of range.
    #[error("Invalid validity window: {0}")]
    InvalidValidityWindowError(String),

    /// The serial number is zero, too long or otherwise not encodable.
    #[error("Invalid serial number: {0}")]
    InvalidSerialNumberError(String),

    /// Subject and issuer do not encode identically.
    #[error("Issuer name does not match subject name of a self-signed certificate")]
    IssuerMismatchError,

    /// The certificate could not be signed.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// The embedded signature does not verify.
    #[error("Signature verification failed: {0}")]
    VerificationError(String),

    /// Internal invariant violation while encoding an artifact.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),
}

impl SelfCertError {
    /// Returns the pipeline stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            SelfCertError::KeyGenerationError(_) => Stage::KeyGeneration,
            SelfCertError::InvalidAttributeError { .. } => Stage::DistinguishedName,
            SelfCertError::UnsupportedExtensionError { .. } => Stage::Extensions,
            SelfCertError::EmptyNameError { .. }
            | SelfCertError::InvalidValidityWindowError(_)
            | SelfCertError::InvalidSerialNumberError(_)
            | SelfCertError::IssuerMismatchError => Stage::Assembly,
            SelfCertError::SigningError(_) | SelfCertError::VerificationError(_) => Stage::Signing,
            SelfCertError::EncodingError(_) => Stage::Encoding,
        }
    }

    /// `true` when the failure stems from caller input and can be fixed by changing
    /// the configuration, `false` for environmental or internal failures.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            SelfCertError::InvalidAttributeError { .. }
            | SelfCertError::UnsupportedExtensionError { .. }
            | SelfCertError::EmptyNameError { .. }
            | SelfCertError::InvalidValidityWindowError(_)
            | SelfCertError::InvalidSerialNumberError(_)
            | SelfCertError::IssuerMismatchError => true,
            SelfCertError::KeyGenerationError(_)
            | SelfCertError::SigningError(_)
            | SelfCertError::VerificationError(_)
            | SelfCertError::EncodingError(_) => false,
        }
    }
}

impl From<der::Error> for SelfCertError {
    /// Converts a `der::Error` into a `SelfCertError`.
    fn from(err: der::Error) -> Self {
        SelfCertError::EncodingError(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for SelfCertError {
    fn from(err: x509_cert::spki::Error) -> Self {
        SelfCertError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for SelfCertError {
    fn from(err: pkcs8::Error) -> Self {
        SelfCertError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for SelfCertError {
    fn from(err: rsa::Error) -> Self {
        SelfCertError::KeyGenerationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let err = SelfCertError::EmptyNameError { field: "subject" };
        assert_eq!(err.stage(), Stage::Assembly);
        assert!(err.is_configuration_error());

        let err = SelfCertError::KeyGenerationError("no entropy".to_string());
        assert_eq!(err.stage(), Stage::KeyGeneration);
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = SelfCertError::InvalidAttributeError {
            attribute: "localityName".to_string(),
            reason: "value must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid attribute localityName: value must not be empty"
        );
        assert_eq!(
            SelfCertError::EmptyNameError { field: "issuer" }.to_string(),
            "The issuer name must contain at least one attribute"
        );
    }
}
