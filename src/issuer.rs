use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cert::SignedCertificate;
use crate::cert::extensions::build_extensions;
use crate::cert::params::{IdentityParams, ValidityWindow};
use crate::error::{Result, SelfCertError};
use crate::key::KeyPair;
use crate::pem_utils::{encode_certificate, encode_private_key};
use crate::tbs_certificate::UnsignedCertificate;

/// The artifacts of one issuance.
///
/// # Fields
/// * `private_key_pem` - The PKCS#8 private key, zeroized on drop.
/// * `certificate_pem` - The self-signed X.509 v3 certificate.
/// * `certificate` - The same certificate in structured form, for callers that want DER.
pub struct IssuedIdentity {
    pub private_key_pem: Zeroizing<String>,
    pub certificate_pem: String,
    pub certificate: SignedCertificate,
}

impl std::fmt::Debug for IssuedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedIdentity")
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

/// Issues a self-signed identity.
///
/// Runs key generation, extension building, assembly, signing and encoding in
/// that order. Any failure aborts the whole issuance, nothing partial is
/// returned. The key pair is dropped before this returns, only its PEM escapes.
///
/// # Arguments
/// * `params` - The identity configuration, see [`IdentityParams::builder`].
pub fn issue_self_signed(params: &IdentityParams) -> Result<IssuedIdentity> {
    // Configuration errors surface before key generation.
    if params.subject.is_empty() {
        return Err(SelfCertError::EmptyNameError { field: "subject" });
    }
    let validity = match params.not_before {
        Some(not_before) => ValidityWindow::for_years(not_before, params.validity_years)?,
        None => ValidityWindow::from_now(params.validity_years)?,
    };

    let key = KeyPair::generate(params.key_algorithm, params.key_strength)?;
    let public_key = key.public_key();

    let extensions = build_extensions(&params.extensions, &public_key)?;
    debug!(extensions = extensions.len(), "built extensions");

    let unsigned = UnsignedCertificate::assemble_self_signed(
        &public_key,
        params.serial_number.clone(),
        validity,
        &params.subject,
        extensions,
    )?;
    let certificate = unsigned.sign(&key, params.signature_algorithm)?;

    let private_key_pem = encode_private_key(&key)?;
    let certificate_pem = encode_certificate(&certificate)?;
    drop(key);

    info!(
        serial = %params.serial_number,
        bits = params.key_strength,
        not_after = %validity.not_after(),
        "issued self-signed identity"
    );

    Ok(IssuedIdentity {
        private_key_pem,
        certificate_pem,
        certificate,
    })
}
