//! # selfcert - Self-Signed X.509 Identities in Pure Rust
//!
//! selfcert issues a single self-signed X.509 v3 identity: it generates an RSA key
//! pair, builds the subject name and extension set, signs the certificate with the
//! key it certifies and returns the private key and certificate as PEM.
//! It is built entirely with rustcrypto libraries, openssl is only used in tests.
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048, 3072, and 4096-bit keys, signed with SHA-256, SHA-384 or SHA-512
//!
//! ## Supported Extensions
//!
//! - Basic constraints and key usage, both marked critical
//! - Extended key usage
//! - The legacy Netscape certificate type
//! - Subject alternative names (email, DNS, URI and IP address)
//! - Subject key identifier, derived from the generated key
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use selfcert::{
//!     cert::{
//!         extensions::ExtensionRequest,
//!         params::{AttributeType, DistinguishedName, IdentityParams},
//!     },
//!     issuer::issue_self_signed,
//! };
//!
//! # fn main() -> Result<(), selfcert::error::SelfCertError> {
//! let subject = DistinguishedName::build([
//!     (AttributeType::CommonName, "example.org"),
//!     (AttributeType::Country, "US"),
//!     (AttributeType::StateOrProvince, "Virginia"),
//!     (AttributeType::Locality, "Blacksburg"),
//!     (AttributeType::Organization, "Test"),
//!     (AttributeType::OrganizationalUnit, "Test"),
//! ])?;
//!
//! let params = IdentityParams::builder()
//!     .subject(subject)
//!     .extensions(ExtensionRequest::identity_profile("http://example.org/webid#me"))
//!     .build();
//!
//! let identity = issue_self_signed(&params)?;
//! println!("{}", identity.certificate_pem);
//! # Ok(())
//! # }
//! ```
//!
//! ### Driving the stages by hand
//!
//! ```rust,no_run
//! use selfcert::{
//!     cert::{
//!         SignatureAlgorithm,
//!         extensions::{AltNameRequest, ExtensionRequest, build_extensions},
//!         params::{AttributeType, DistinguishedName, SerialNumber, ValidityWindow},
//!     },
//!     key::KeyPair,
//!     pem_utils,
//!     tbs_certificate::UnsignedCertificate,
//! };
//!
//! # fn main() -> Result<(), selfcert::error::SelfCertError> {
//! let key = KeyPair::generate_rsa(3072)?;
//! let name = DistinguishedName::build([(AttributeType::CommonName, "host.local")])?;
//! let extensions = build_extensions(
//!     &[
//!         ExtensionRequest::SubjectAltName(vec![AltNameRequest::dns("host.local")]),
//!         ExtensionRequest::SubjectKeyIdentifier,
//!     ],
//!     &key.public_key(),
//! )?;
//!
//! let cert = UnsignedCertificate::assemble_self_signed(
//!     &key.public_key(),
//!     SerialNumber::random(),
//!     ValidityWindow::from_now(2)?,
//!     &name,
//!     extensions,
//! )?
//! .sign(&key, SignatureAlgorithm::Sha384WithRSA)?;
//!
//! cert.verify_self_signature()?;
//! let key_pem = pem_utils::encode_private_key(&key)?;
//! let cert_der = cert.to_der()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`error::SelfCertError`] naming the stage that failed:
//!
//! ```rust
//! use selfcert::{cert::params::{AttributeType, DistinguishedName}, error::SelfCertError};
//!
//! match DistinguishedName::build([(AttributeType::Country, "")]) {
//!     Ok(_) => unreachable!(),
//!     Err(SelfCertError::InvalidAttributeError { attribute, reason }) => {
//!         println!("bad {attribute}: {reason}")
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation and export
//! - [`cert`]: Names, validity, serials, extensions and signing
//! - [`tbs_certificate`]: Assembly of the to-be-signed structure
//! - [`pem_utils`]: PEM encoding of the issued artifacts
//! - [`issuer`]: The end-to-end issuance pipeline
//! - [`error`]: Error types and stage classification

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod tbs_certificate;
