mod util;

use der::{DecodePem, Encode};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use selfcert::cert::extensions::{
    AltName, ExtensionKind, ExtensionRecord, ExtensionRequest, build_extensions,
};
use selfcert::cert::params::{DistinguishedName, IdentityParams};
use selfcert::error::SelfCertError;
use selfcert::issuer::issue_self_signed;
use selfcert::key::PublicKey;
use sha1::{Digest, Sha1};
use time::OffsetDateTime;
use time::macros::datetime;
use x509_cert::Certificate;

pub type Result<T> = std::result::Result<T, SelfCertError>;

fn parse(pem: &str) -> Certificate {
    Certificate::from_pem(pem.as_bytes()).expect("certificate PEM should parse")
}

fn records(cert: &Certificate) -> Vec<ExtensionRecord> {
    cert.tbs_certificate
        .extensions
        .as_ref()
        .unwrap()
        .iter()
        .map(|ext| ExtensionRecord::from_x509_extension(ext).unwrap())
        .collect()
}

fn unix(time: x509_cert::time::Time) -> i64 {
    time.to_unix_duration().as_secs() as i64
}

/// Parses the reference identity back and checks every field that was configured.
#[test]
fn reference_identity_round_trip() -> Result<()> {
    let identity = util::issue_reference();
    let cert = parse(&identity.certificate_pem);
    let tbs = &cert.tbs_certificate;

    assert_eq!(tbs.version, x509_cert::Version::V3);
    assert_eq!(tbs.serial_number.as_bytes(), &[0x01]);
    assert_eq!(tbs.subject.to_der()?, tbs.issuer.to_der()?);
    assert_eq!(
        DistinguishedName::from_x509_name(&tbs.subject)?,
        util::reference_subject()
    );
    assert_eq!(cert.to_der()?, identity.certificate.to_der()?);

    let kinds: Vec<_> = records(&cert).iter().map(ExtensionRecord::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ExtensionKind::BasicConstraints,
            ExtensionKind::KeyUsage,
            ExtensionKind::ExtendedKeyUsage,
            ExtensionKind::LegacyCertType,
            ExtensionKind::SubjectAltName,
            ExtensionKind::SubjectKeyIdentifier,
        ]
    );
    let critical: Vec<_> = tbs
        .extensions
        .as_ref()
        .unwrap()
        .iter()
        .map(|ext| ext.critical)
        .collect();
    assert_eq!(critical, vec![true, true, false, false, false, false]);

    // Every decoded extension equals what the profile requests for the embedded key
    let embedded = RsaPublicKey::from_public_key_der(&tbs.subject_public_key_info.to_der()?)
        .expect("embedded key should decode");
    let expected = build_extensions(
        &ExtensionRequest::identity_profile(util::WEBID),
        &PublicKey::Rsa(embedded),
    )?;
    assert_eq!(records(&cert), expected);

    let ns_cert_type = &tbs.extensions.as_ref().unwrap()[3];
    assert_eq!(ns_cert_type.extn_value.as_bytes(), &[0x03, 0x02, 0x00, 0xf7]);

    identity.certificate.verify_self_signature()?;
    Ok(())
}

#[test]
fn subject_key_identifier_matches_embedded_key() {
    let identity = util::issue_reference();
    let cert = parse(&identity.certificate_pem);
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let expected = Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec();

    let ski = records(&cert)
        .into_iter()
        .find_map(|r| match r {
            ExtensionRecord::SubjectKeyIdentifier(ski) => Some(ski.0),
            _ => None,
        })
        .unwrap();
    assert_eq!(ski, expected);

    let san = records(&cert)
        .into_iter()
        .find_map(|r| match r {
            ExtensionRecord::SubjectAltName(san) => Some(san.names),
            _ => None,
        })
        .unwrap();
    assert_eq!(san, vec![AltName::Uri(util::WEBID.to_string())]);
}

#[test]
fn private_key_matches_certificate() {
    let identity = util::issue_reference();
    let cert = parse(&identity.certificate_pem);

    let private = RsaPrivateKey::from_pkcs8_pem(&identity.private_key_pem).unwrap();
    let spki_der = cert.tbs_certificate.subject_public_key_info.to_der().unwrap();
    let public = RsaPublicKey::from_public_key_der(&spki_der).unwrap();
    assert_eq!(RsaPublicKey::from(&private), public);
}

#[test]
fn two_runs_differ_only_in_key_material() {
    let first = parse(&util::issue_reference().certificate_pem);
    let second = parse(&util::issue_reference().certificate_pem);

    assert_ne!(
        first.tbs_certificate.subject_public_key_info,
        second.tbs_certificate.subject_public_key_info
    );
    assert_ne!(first.signature, second.signature);

    assert_eq!(first.tbs_certificate.subject, second.tbs_certificate.subject);
    assert_eq!(
        first.tbs_certificate.serial_number,
        second.tbs_certificate.serial_number
    );
    let kinds = |c: &Certificate| records(c).iter().map(ExtensionRecord::kind).collect::<Vec<_>>();
    assert_eq!(kinds(&first), kinds(&second));
}

#[test]
fn validity_spans_one_calendar_year() {
    let mut params = util::reference_params();
    params.not_before = Some(datetime!(2023-03-01 10:00:00 UTC));
    let cert = parse(&issue_self_signed(&params).unwrap().certificate_pem);
    let validity = cert.tbs_certificate.validity;

    assert_eq!(
        unix(validity.not_before),
        datetime!(2023-03-01 10:00:00 UTC).unix_timestamp()
    );
    assert_eq!(
        unix(validity.not_after),
        datetime!(2024-03-01 10:00:00 UTC).unix_timestamp()
    );
}

#[test]
fn leap_day_start_is_clamped() {
    let mut params = util::reference_params();
    params.not_before = Some(datetime!(2024-02-29 00:00:00 UTC));
    let cert = parse(&issue_self_signed(&params).unwrap().certificate_pem);
    assert_eq!(
        unix(cert.tbs_certificate.validity.not_after),
        datetime!(2025-02-28 00:00:00 UTC).unix_timestamp()
    );

    params.validity_years = 4;
    let cert = parse(&issue_self_signed(&params).unwrap().certificate_pem);
    assert_eq!(
        unix(cert.tbs_certificate.validity.not_after),
        datetime!(2028-02-29 00:00:00 UTC).unix_timestamp()
    );
}

#[test]
fn default_validity_starts_now() {
    let before = OffsetDateTime::now_utc().unix_timestamp();
    let cert = parse(&util::issue_reference().certificate_pem);
    let after = OffsetDateTime::now_utc().unix_timestamp();

    let not_before = unix(cert.tbs_certificate.validity.not_before);
    assert!(before <= not_before && not_before <= after);
}

#[test]
fn empty_subject_is_rejected() {
    let params = IdentityParams::builder()
        .subject(DistinguishedName::default())
        .build();
    assert!(matches!(
        issue_self_signed(&params),
        Err(SelfCertError::EmptyNameError { field: "subject" })
    ));
}

fn issue_with_strength(bits: usize) -> Result<()> {
    let mut params = util::reference_params();
    params.key_strength = bits;
    let identity = issue_self_signed(&params)?;
    identity.certificate.verify_self_signature()?;

    let private = RsaPrivateKey::from_pkcs8_pem(&identity.private_key_pem).unwrap();
    assert_eq!(rsa::traits::PublicKeyParts::size(&private) * 8, bits);
    Ok(())
}

#[test]
#[ignore = "slow RSA key generation"]
fn rsa_3072_identity() -> Result<()> {
    issue_with_strength(3072)
}

#[test]
#[ignore = "slow RSA key generation"]
fn rsa_4096_identity() -> Result<()> {
    issue_with_strength(4096)
}
