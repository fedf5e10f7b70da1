pub mod extensions;
pub mod params;

use crate::error::{Result, SelfCertError};
use const_oid::{AssociatedOid, ObjectIdentifier};
use der::asn1::{AnyRef, BitString};
use der::{Any, Encode, EncodePem};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::debug;
use x509_cert::certificate::CertificateInner;

use crate::key::KeyPair;
use crate::tbs_certificate::UnsignedCertificate;

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    #[default]
    Sha256WithRSA,
    /// SHA-384 with RSA encryption.
    Sha384WithRSA,
    /// SHA-512 with RSA encryption.
    Sha512WithRSA,
}

impl SignatureAlgorithm {
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha256WithRSA => const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRSA => const_oid::db::rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRSA => const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        }
    }

    /// Looks up the algorithm for a signature algorithm OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        [
            SignatureAlgorithm::Sha256WithRSA,
            SignatureAlgorithm::Sha384WithRSA,
            SignatureAlgorithm::Sha512WithRSA,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *oid)
        .ok_or_else(|| SelfCertError::VerificationError(format!("unsupported signature algorithm {oid}")))
    }

    fn sign_rsa(self, key: &RsaPrivateKey, msg: &[u8]) -> Result<Vec<u8>> {
        match self {
            SignatureAlgorithm::Sha256WithRSA => rsa_sign::<Sha256>(key, msg),
            SignatureAlgorithm::Sha384WithRSA => rsa_sign::<Sha384>(key, msg),
            SignatureAlgorithm::Sha512WithRSA => rsa_sign::<Sha512>(key, msg),
        }
    }

    fn verify_rsa(self, key: RsaPublicKey, msg: &[u8], signature: &[u8]) -> Result<()> {
        match self {
            SignatureAlgorithm::Sha256WithRSA => rsa_verify::<Sha256>(key, msg, signature),
            SignatureAlgorithm::Sha384WithRSA => rsa_verify::<Sha384>(key, msg, signature),
            SignatureAlgorithm::Sha512WithRSA => rsa_verify::<Sha512>(key, msg, signature),
        }
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA PKCS#1 v1.5 identifiers carry explicit NULL parameters (RFC 4055).
    fn from(value: SignatureAlgorithm) -> Self {
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters: Some(Any::from(AnyRef::NULL)),
        }
    }
}

/// PKCS#1 v1.5 signature over `D(msg)`, borrowing the private key.
fn rsa_sign<D>(key: &RsaPrivateKey, msg: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + AssociatedOid,
{
    let hashed = D::digest(msg);
    key.sign(Pkcs1v15Sign::new::<D>(), &hashed)
        .map_err(|e| SelfCertError::SigningError(e.to_string()))
}

fn rsa_verify<D>(key: RsaPublicKey, msg: &[u8], signature: &[u8]) -> Result<()>
where
    D: Digest + AssociatedOid,
{
    let verifying_key = VerifyingKey::<D>::new(key);
    let signature = Signature::try_from(signature)
        .map_err(|e| SelfCertError::VerificationError(e.to_string()))?;
    verifying_key
        .verify(msg, &signature)
        .map_err(|e| SelfCertError::VerificationError(e.to_string()))
}

/// Represents a signed X.509 certificate.
///
/// The exact to-be-signed bytes are kept alongside the parsed structure, so the
/// certificate can be checked against what was actually signed.
#[derive(Debug, Clone)]
pub struct SignedCertificate {
    inner: CertificateInner,
    tbs_der: Vec<u8>,
}

impl SignedCertificate {
    /// Signs the certificate with the private key matching its own public key.
    ///
    /// Fails with [`SelfCertError::SigningError`] if `key` is not the key pair whose
    /// public half is being certified.
    pub fn sign(
        tbs: UnsignedCertificate,
        key: &KeyPair,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self> {
        let certified = tbs.subject_public_key_info().to_der()?;
        let signing = key.public_key().to_spki()?.to_der()?;
        if certified != signing {
            return Err(SelfCertError::SigningError(
                "signing key does not match the certified public key".to_string(),
            ));
        }

        let tbs_certificate = tbs.to_tbs_certificate_inner(algorithm)?;
        let tbs_der = tbs_certificate.to_der()?;

        let signature = match key {
            KeyPair::Rsa { private, .. } => algorithm.sign_rsa(private, &tbs_der)?,
        };
        debug!(?algorithm, tbs_len = tbs_der.len(), "signed certificate");

        let inner = CertificateInner {
            tbs_certificate,
            signature_algorithm: algorithm.into(),
            signature: BitString::from_bytes(&signature)?,
        };
        Ok(Self { inner, tbs_der })
    }

    /// The underlying certificate structure.
    pub fn inner(&self) -> &CertificateInner {
        &self.inner
    }

    /// The DER bytes the signature was computed over.
    pub fn tbs_der(&self) -> &[u8] {
        &self.tbs_der
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::from_oid(&self.inner.signature_algorithm.oid)
    }

    /// Verifies the signature against the public key embedded in the certificate.
    pub fn verify_self_signature(&self) -> Result<()> {
        let spki = self.inner.tbs_certificate.subject_public_key_info.to_der()?;
        let public = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| SelfCertError::VerificationError(e.to_string()))?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            SelfCertError::VerificationError("signature is not octet aligned".to_string())
        })?;
        self.signature_algorithm()?
            .verify_rsa(public, &self.tbs_der, signature)
    }

    /// Encodes the certificate into DER format.
    ///
    /// # Returns
    /// A byte vector containing the DER-encoded certificate.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| SelfCertError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    ///
    /// # Returns
    /// A string containing the PEM-encoded certificate.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| SelfCertError::EncodingError(e.to_string()))
    }
}
