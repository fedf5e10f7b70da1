use der::Encode;
use tracing::debug;
use zeroize::Zeroizing;

use crate::cert::SignedCertificate;
use crate::error::{Result, SelfCertError};
use crate::key::KeyPair;

/// Encode the private key as PKCS#8 `PRIVATE KEY` PEM with LF line endings.
///
/// The returned string zeroizes its buffer on drop.
pub fn encode_private_key(key: &KeyPair) -> Result<Zeroizing<String>> {
    let pem = key.to_pkcs8_pem()?;
    debug!(len = pem.len(), "encoded private key");
    Ok(pem)
}

/// Encode a signed certificate as `CERTIFICATE` PEM.
///
/// The certificate is re-encoded first and must reproduce the exact bytes that
/// were signed.
pub fn encode_certificate(cert: &SignedCertificate) -> Result<String> {
    let tbs_der = cert.inner().tbs_certificate.to_der()?;
    if tbs_der != cert.tbs_der() {
        return Err(SelfCertError::EncodingError(
            "re-encoded TBS certificate differs from the signed bytes".to_string(),
        ));
    }
    let pem = cert.to_pem()?;
    debug!(len = pem.len(), "encoded certificate");
    Ok(pem)
}
