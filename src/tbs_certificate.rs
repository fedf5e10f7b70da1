use crate::error::{Result, SelfCertError};
use tracing::debug;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::extensions::ExtensionRecord;
use crate::cert::params::{DistinguishedName, SerialNumber, ValidityWindow, name_der};
use crate::cert::{SignatureAlgorithm, SignedCertificate};
use crate::key::{KeyPair, PublicKey};

/// Represents the "To Be Signed" (TBS) portion of an X.509 v3 certificate.
///
/// Assembling performs no cryptography. The structure cannot be modified once
/// assembled, only signed.
///
/// # Fields
/// * `serial_number` - The unique identifier for the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The encoded public key of the certificate subject.
/// * `extensions` - X.509 extensions, in output order.
#[derive(Debug, Clone)]
pub struct UnsignedCertificate {
    serial_number: SerialNumber,
    issuer: DistinguishedName,
    validity: ValidityWindow,
    subject: DistinguishedName,
    subject_public_key_info: SubjectPublicKeyInfoOwned,
    extensions: Vec<ExtensionRecord>,
}

impl UnsignedCertificate {
    /// Assembles a certificate from its parts.
    ///
    /// Subject and issuer must both be non-empty and, since every certificate issued
    /// here is self-signed, must encode identically.
    pub fn assemble(
        subject_public_key: &PublicKey,
        serial_number: SerialNumber,
        validity: ValidityWindow,
        subject: &DistinguishedName,
        issuer: &DistinguishedName,
        extensions: Vec<ExtensionRecord>,
    ) -> Result<Self> {
        if subject.is_empty() {
            return Err(SelfCertError::EmptyNameError { field: "subject" });
        }
        if issuer.is_empty() {
            return Err(SelfCertError::EmptyNameError { field: "issuer" });
        }
        if validity.not_before() > validity.not_after() {
            return Err(SelfCertError::InvalidValidityWindowError(format!(
                "not before {} is later than not after {}",
                validity.not_before(),
                validity.not_after()
            )));
        }
        if name_der(&subject.as_x509_name()?)? != name_der(&issuer.as_x509_name()?)? {
            return Err(SelfCertError::IssuerMismatchError);
        }

        let subject_public_key_info = subject_public_key.to_spki()?;
        debug!(
            serial = %serial_number,
            not_after = %validity.not_after(),
            extensions = extensions.len(),
            "assembled certificate"
        );

        Ok(Self {
            serial_number,
            issuer: issuer.clone(),
            validity,
            subject: subject.clone(),
            subject_public_key_info,
            extensions,
        })
    }

    /// Assembles a self-signed certificate, using `name` as both subject and issuer.
    pub fn assemble_self_signed(
        subject_public_key: &PublicKey,
        serial_number: SerialNumber,
        validity: ValidityWindow,
        name: &DistinguishedName,
        extensions: Vec<ExtensionRecord>,
    ) -> Result<Self> {
        Self::assemble(
            subject_public_key,
            serial_number,
            validity,
            name,
            name,
            extensions,
        )
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    pub fn validity(&self) -> &ValidityWindow {
        &self.validity
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        &self.subject_public_key_info
    }

    pub fn extensions(&self) -> &[ExtensionRecord] {
        &self.extensions
    }

    /// Signs the certificate, see [`SignedCertificate::sign`].
    pub fn sign(self, key: &KeyPair, algorithm: SignatureAlgorithm) -> Result<SignedCertificate> {
        SignedCertificate::sign(self, key, algorithm)
    }

    /// Converts the `UnsignedCertificate` into a `TbsCertificateInner` for DER encoding.
    ///
    /// # Returns
    /// A `TbsCertificateInner` object suitable for DER encoding.
    pub fn to_tbs_certificate_inner(
        &self,
        signature_algorithm: SignatureAlgorithm,
    ) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(ExtensionRecord::to_x509_extension)
            .collect::<Result<Vec<_>>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: self.serial_number.to_x509_serial()?,
            signature: signature_algorithm.into(),
            issuer: self.issuer.as_x509_name()?,
            validity: self.validity.to_x509_validity()?,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: (!extensions.is_empty()).then_some(extensions),
        })
    }

    /// Encodes the TBS structure into DER format.
    pub fn to_der(&self, signature_algorithm: SignatureAlgorithm) -> Result<Vec<u8>> {
        use der::Encode;
        Ok(self.to_tbs_certificate_inner(signature_algorithm)?.to_der()?)
    }
}
