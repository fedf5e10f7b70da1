use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use zeroize::Zeroizing;

use crate::error::{Result, SelfCertError};

/// RSA modulus sizes accepted by [`KeyPair::generate`].
pub const SUPPORTED_RSA_BITS: [usize; 3] = [2048, 3072, 4096];

/// Asymmetric key algorithms available for the generated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    #[default]
    Rsa,
}

/// Supported key types for certificate operations.
///
/// The private half zeroizes itself on drop.
#[derive(Clone)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("strength", &self.strength())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a key pair of the given algorithm and strength.
    ///
    /// For RSA the strength is the modulus length in bits and must be one of
    /// [`SUPPORTED_RSA_BITS`].
    pub fn generate(algorithm: KeyAlgorithm, strength: usize) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Rsa => Self::generate_rsa(strength),
        }
    }

    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        if !SUPPORTED_RSA_BITS.contains(&bits) {
            return Err(SelfCertError::KeyGenerationError(format!(
                "unsupported RSA modulus size {bits}, expected one of {SUPPORTED_RSA_BITS:?}"
            )));
        }

        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        let public = RsaPublicKey::from(&private);
        debug!(bits, "generated RSA key pair");

        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyPair::Rsa { .. } => KeyAlgorithm::Rsa,
        }
    }

    /// Key strength in bits.
    pub fn strength(&self) -> usize {
        match self {
            KeyPair::Rsa { public, .. } => public.size() * 8,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_key_pair(self)
    }

    /// Exports the private key as PKCS#8 PEM.
    pub fn to_pkcs8_pem(&self) -> Result<Zeroizing<String>> {
        match self {
            KeyPair::Rsa { private, .. } => private
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| SelfCertError::EncodingError(e.to_string())),
        }
    }
}

/// The public half of a [`KeyPair`], as embedded in the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
        }
    }

    /// Builds the SubjectPublicKeyInfo structure for this key.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        match self {
            PublicKey::Rsa(public) => Ok(SubjectPublicKeyInfoOwned::from_key(public.clone())?),
        }
    }
}
