use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;
use std::net::IpAddr;

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use sha1::{Digest, Sha1};
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::name::GeneralName;

pub use der::flagset::FlagSet;
use der::flagset::flags;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::SelfCertError;
use crate::key::PublicKey;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use selfcert::cert::extensions::{AltName, SubjectAltName, ToAndFromX509Extension};
/// let san = SubjectAltName { names: vec![AltName::Uri("http://example.org/webid#me".to_string())] };
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san.names, decoded.names);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError>
    where
        Self: Sized;
}

/// GeneralName tag numbers accepted in a subject alternative name request.
pub mod name_type {
    pub const RFC822_NAME: u8 = 1;
    pub const DNS_NAME: u8 = 2;
    pub const URI: u8 = 6;
    pub const IP_ADDRESS: u8 = 7;
}

/// A single subject alternative name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltName {
    Email(String),
    Dns(String),
    Uri(String),
    Ip(IpAddr),
}

impl AltName {
    /// Builds an alternative name from its GeneralName tag number and textual value.
    pub fn from_tag(tag: u8, value: &str) -> Result<Self, SelfCertError> {
        let name = match tag {
            name_type::RFC822_NAME => AltName::Email(value.to_string()),
            name_type::DNS_NAME => AltName::Dns(value.to_string()),
            name_type::URI => AltName::Uri(value.to_string()),
            name_type::IP_ADDRESS => AltName::Ip(value.parse().map_err(|_| {
                san_error(format!("{value:?} is not an IP address"))
            })?),
            other => return Err(san_error(format!("unsupported name type tag {other}"))),
        };
        if let AltName::Email(v) | AltName::Dns(v) | AltName::Uri(v) = &name {
            if v.is_empty() {
                return Err(san_error(format!("empty value for name type tag {tag}")));
            }
            Ia5String::new(v).map_err(|e| san_error(format!("{v:?}: {e}")))?;
        }
        Ok(name)
    }

    pub fn tag(&self) -> u8 {
        match self {
            AltName::Email(_) => name_type::RFC822_NAME,
            AltName::Dns(_) => name_type::DNS_NAME,
            AltName::Uri(_) => name_type::URI,
            AltName::Ip(_) => name_type::IP_ADDRESS,
        }
    }

    fn to_general_name(&self) -> Result<GeneralName, SelfCertError> {
        let ia5 = |v: &str| Ia5String::new(v).map_err(|e| san_error(format!("{v:?}: {e}")));
        Ok(match self {
            AltName::Email(v) => GeneralName::Rfc822Name(ia5(v)?),
            AltName::Dns(v) => GeneralName::DnsName(ia5(v)?),
            AltName::Uri(v) => GeneralName::UniformResourceIdentifier(ia5(v)?),
            AltName::Ip(IpAddr::V4(ip)) => GeneralName::IpAddress(OctetString::new(ip.octets())?),
            AltName::Ip(IpAddr::V6(ip)) => GeneralName::IpAddress(OctetString::new(ip.octets())?),
        })
    }

    fn from_general_name(name: &GeneralName) -> Result<Self, SelfCertError> {
        match name {
            GeneralName::Rfc822Name(v) => Ok(AltName::Email(v.to_string())),
            GeneralName::DnsName(v) => Ok(AltName::Dns(v.to_string())),
            GeneralName::UniformResourceIdentifier(v) => Ok(AltName::Uri(v.to_string())),
            GeneralName::IpAddress(octets) => match octets.as_bytes().len() {
                4 => {
                    let mut ip = [0u8; 4];
                    ip.copy_from_slice(octets.as_bytes());
                    Ok(AltName::Ip(IpAddr::from(ip)))
                }
                16 => {
                    let mut ip = [0u8; 16];
                    ip.copy_from_slice(octets.as_bytes());
                    Ok(AltName::Ip(IpAddr::from(ip)))
                }
                len => Err(san_error(format!("IP address of {len} octets"))),
            },
            _ => Err(san_error("unsupported general name type".to_string())),
        }
    }
}

fn san_error(reason: String) -> SelfCertError {
    SelfCertError::UnsupportedExtensionError {
        kind: ExtensionKind::SubjectAltName.to_string(),
        reason,
    }
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// This extension specifies additional identities for the subject of the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltName {
    pub names: Vec<AltName>,
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.names
                .iter()
                .map(AltName::to_general_name)
                .collect::<Result<Vec<_>, _>>()?,
        );

        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let names = san
            .0
            .iter()
            .map(AltName::from_general_name)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { names })
    }
}

/// Represents the Basic Constraints extension.
///
/// This extension indicates whether the certificate is a CA certificate and its path length.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, SelfCertError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        let ku = X509KeyUsage::from(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension.
///
/// This extension indicates purposes for which the public key may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku
            .0
            .iter()
            .map(|v| match *v {
                const_oid::db::rfc5912::ID_KP_OCSP_SIGNING => {
                    Ok(ExtendedKeyUsageOption::OcspSigning)
                }
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Ok(ExtendedKeyUsageOption::ServerAuth),
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Ok(ExtendedKeyUsageOption::ClientAuth),
                const_oid::db::rfc5912::ID_KP_CODE_SIGNING => {
                    Ok(ExtendedKeyUsageOption::CodeSigning)
                }
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION => {
                    Ok(ExtendedKeyUsageOption::EmailProtection)
                }
                const_oid::db::rfc5912::ID_KP_TIME_STAMPING => {
                    Ok(ExtendedKeyUsageOption::TimeStamping)
                }
                other => Err(SelfCertError::UnsupportedExtensionError {
                    kind: ExtensionKind::ExtendedKeyUsage.to_string(),
                    reason: format!("unsupported key purpose {other}"),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { usage })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
        }
    }
}

flags! {
    /// Bits of the legacy Netscape certificate type extension.
    pub enum NetscapeCertTypes: u8 {
        SslClient = 1 << 0,
        SslServer = 1 << 1,
        Smime = 1 << 2,
        ObjectSigning = 1 << 3,
        SslCa = 1 << 5,
        SmimeCa = 1 << 6,
        ObjectSigningCa = 1 << 7,
    }
}

/// Represents the legacy Netscape certificate type extension (`nsCertType`).
///
/// Superseded by extended key usage, still inspected by some older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetscapeCertType(pub FlagSet<NetscapeCertTypes>);

impl ToAndFromX509Extension for NetscapeCertType {
    const OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.113730.1.1");

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        Ok(self.0.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError> {
        Ok(Self(FlagSet::<NetscapeCertTypes>::from_der(extension)?))
    }
}

/// Represents the Subject Key Identifier extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl SubjectKeyIdentifier {
    /// SHA-1 over the subjectPublicKey BIT STRING contents (RFC 5280, method 1).
    pub fn from_public_key(key: &PublicKey) -> Result<Self, SelfCertError> {
        let spki = key.to_spki()?;
        let digest = Sha1::digest(spki.subject_public_key.raw_bytes());
        Ok(Self(digest.to_vec()))
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfCertError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.0.clone())?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfCertError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// The extension kinds this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    BasicConstraints,
    KeyUsage,
    ExtendedKeyUsage,
    LegacyCertType,
    SubjectAltName,
    SubjectKeyIdentifier,
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionKind::BasicConstraints => "basicConstraints",
            ExtensionKind::KeyUsage => "keyUsage",
            ExtensionKind::ExtendedKeyUsage => "extKeyUsage",
            ExtensionKind::LegacyCertType => "nsCertType",
            ExtensionKind::SubjectAltName => "subjectAltName",
            ExtensionKind::SubjectKeyIdentifier => "subjectKeyIdentifier",
        };
        f.write_str(name)
    }
}

impl FromStr for ExtensionKind {
    type Err = SelfCertError;

    fn from_str(s: &str) -> Result<Self, SelfCertError> {
        match s {
            "basicConstraints" => Ok(ExtensionKind::BasicConstraints),
            "keyUsage" => Ok(ExtensionKind::KeyUsage),
            "extKeyUsage" | "extendedKeyUsage" => Ok(ExtensionKind::ExtendedKeyUsage),
            "nsCertType" | "netscapeCertType" => Ok(ExtensionKind::LegacyCertType),
            "subjectAltName" => Ok(ExtensionKind::SubjectAltName),
            "subjectKeyIdentifier" => Ok(ExtensionKind::SubjectKeyIdentifier),
            other => Err(SelfCertError::UnsupportedExtensionError {
                kind: other.to_string(),
                reason: "unknown extension kind".to_string(),
            }),
        }
    }
}

/// A subject alternative name entry as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltNameRequest {
    pub name_type: u8,
    pub value: String,
}

impl AltNameRequest {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            name_type: name_type::URI,
            value: value.into(),
        }
    }

    pub fn dns(value: impl Into<String>) -> Self {
        Self {
            name_type: name_type::DNS_NAME,
            value: value.into(),
        }
    }
}

/// An extension requested by the caller, validated by [`build_extensions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionRequest {
    /// `ca` must be set explicitly.
    BasicConstraints { ca: Option<bool>, path_len: Option<u8> },
    KeyUsage(FlagSet<KeyUsages>),
    ExtendedKeyUsage(Vec<ExtendedKeyUsageOption>),
    LegacyCertType(FlagSet<NetscapeCertTypes>),
    SubjectAltName(Vec<AltNameRequest>),
    /// Derived from the subject public key.
    SubjectKeyIdentifier,
}

impl ExtensionRequest {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            ExtensionRequest::BasicConstraints { .. } => ExtensionKind::BasicConstraints,
            ExtensionRequest::KeyUsage(_) => ExtensionKind::KeyUsage,
            ExtensionRequest::ExtendedKeyUsage(_) => ExtensionKind::ExtendedKeyUsage,
            ExtensionRequest::LegacyCertType(_) => ExtensionKind::LegacyCertType,
            ExtensionRequest::SubjectAltName(_) => ExtensionKind::SubjectAltName,
            ExtensionRequest::SubjectKeyIdentifier => ExtensionKind::SubjectKeyIdentifier,
        }
    }

    /// The all-purpose CA-capable identity profile: basic constraints, key usage,
    /// extended key usage, Netscape cert type, a single URI alternative name and the
    /// subject key identifier, in that order.
    pub fn identity_profile(uri: impl Into<String>) -> Vec<ExtensionRequest> {
        vec![
            ExtensionRequest::BasicConstraints {
                ca: Some(true),
                path_len: None,
            },
            ExtensionRequest::KeyUsage(
                KeyUsages::KeyCertSign
                    | KeyUsages::DigitalSignature
                    | KeyUsages::NonRepudiation
                    | KeyUsages::KeyEncipherment
                    | KeyUsages::DataEncipherment,
            ),
            ExtensionRequest::ExtendedKeyUsage(vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth,
                ExtendedKeyUsageOption::CodeSigning,
                ExtendedKeyUsageOption::EmailProtection,
                ExtendedKeyUsageOption::TimeStamping,
            ]),
            ExtensionRequest::LegacyCertType(
                NetscapeCertTypes::SslClient
                    | NetscapeCertTypes::SslServer
                    | NetscapeCertTypes::Smime
                    | NetscapeCertTypes::ObjectSigning
                    | NetscapeCertTypes::SslCa
                    | NetscapeCertTypes::SmimeCa
                    | NetscapeCertTypes::ObjectSigningCa,
            ),
            ExtensionRequest::SubjectAltName(vec![AltNameRequest::uri(uri)]),
            ExtensionRequest::SubjectKeyIdentifier,
        ]
    }

    fn build(&self, subject_key: &PublicKey) -> Result<ExtensionRecord, SelfCertError> {
        let kind = self.kind();
        let unsupported = |reason: &str| SelfCertError::UnsupportedExtensionError {
            kind: kind.to_string(),
            reason: reason.to_string(),
        };
        let record = match self {
            ExtensionRequest::BasicConstraints { ca, path_len } => {
                let is_ca = ca.ok_or_else(|| unsupported("the cA flag must be set explicitly"))?;
                if !is_ca && path_len.is_some() {
                    return Err(unsupported("a path length requires cA to be true"));
                }
                ExtensionRecord::BasicConstraints(BasicConstraints {
                    is_ca,
                    max_path_length: *path_len,
                })
            }
            ExtensionRequest::KeyUsage(flags) => {
                if flags.is_empty() {
                    return Err(unsupported("at least one key usage is required"));
                }
                ExtensionRecord::KeyUsage(KeyUsage(*flags))
            }
            ExtensionRequest::ExtendedKeyUsage(usage) => {
                if usage.is_empty() {
                    return Err(unsupported("at least one key purpose is required"));
                }
                ExtensionRecord::ExtendedKeyUsage(ExtendedKeyUsage {
                    usage: usage.clone(),
                })
            }
            ExtensionRequest::LegacyCertType(flags) => {
                if flags.is_empty() {
                    return Err(unsupported("at least one certificate type is required"));
                }
                ExtensionRecord::LegacyCertType(NetscapeCertType(*flags))
            }
            ExtensionRequest::SubjectAltName(names) => {
                if names.is_empty() {
                    return Err(unsupported("at least one name entry is required"));
                }
                let names = names
                    .iter()
                    .map(|n| AltName::from_tag(n.name_type, &n.value))
                    .collect::<Result<Vec<_>, _>>()?;
                ExtensionRecord::SubjectAltName(SubjectAltName { names })
            }
            ExtensionRequest::SubjectKeyIdentifier => ExtensionRecord::SubjectKeyIdentifier(
                SubjectKeyIdentifier::from_public_key(subject_key)?,
            ),
        };
        Ok(record)
    }
}

/// A validated, typed certificate extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionRecord {
    BasicConstraints(BasicConstraints),
    KeyUsage(KeyUsage),
    ExtendedKeyUsage(ExtendedKeyUsage),
    LegacyCertType(NetscapeCertType),
    SubjectAltName(SubjectAltName),
    SubjectKeyIdentifier(SubjectKeyIdentifier),
}

impl ExtensionRecord {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            ExtensionRecord::BasicConstraints(_) => ExtensionKind::BasicConstraints,
            ExtensionRecord::KeyUsage(_) => ExtensionKind::KeyUsage,
            ExtensionRecord::ExtendedKeyUsage(_) => ExtensionKind::ExtendedKeyUsage,
            ExtensionRecord::LegacyCertType(_) => ExtensionKind::LegacyCertType,
            ExtensionRecord::SubjectAltName(_) => ExtensionKind::SubjectAltName,
            ExtensionRecord::SubjectKeyIdentifier(_) => ExtensionKind::SubjectKeyIdentifier,
        }
    }

    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            ExtensionRecord::BasicConstraints(_) => BasicConstraints::OID,
            ExtensionRecord::KeyUsage(_) => KeyUsage::OID,
            ExtensionRecord::ExtendedKeyUsage(_) => ExtendedKeyUsage::OID,
            ExtensionRecord::LegacyCertType(_) => NetscapeCertType::OID,
            ExtensionRecord::SubjectAltName(_) => SubjectAltName::OID,
            ExtensionRecord::SubjectKeyIdentifier(_) => SubjectKeyIdentifier::OID,
        }
    }

    /// Basic constraints and key usage are critical, everything else is not.
    pub fn critical(&self) -> bool {
        matches!(
            self,
            ExtensionRecord::BasicConstraints(_) | ExtensionRecord::KeyUsage(_)
        )
    }

    fn value(&self) -> Result<Vec<u8>, SelfCertError> {
        match self {
            ExtensionRecord::BasicConstraints(ext) => ext.to_x509_extension_value(),
            ExtensionRecord::KeyUsage(ext) => ext.to_x509_extension_value(),
            ExtensionRecord::ExtendedKeyUsage(ext) => ext.to_x509_extension_value(),
            ExtensionRecord::LegacyCertType(ext) => ext.to_x509_extension_value(),
            ExtensionRecord::SubjectAltName(ext) => ext.to_x509_extension_value(),
            ExtensionRecord::SubjectKeyIdentifier(ext) => ext.to_x509_extension_value(),
        }
    }

    /// Encodes the record as an X.509 extension.
    pub fn to_x509_extension(&self) -> Result<Extension, SelfCertError> {
        Ok(Extension {
            extn_id: self.oid(),
            critical: self.critical(),
            extn_value: OctetString::new(self.value()?)?,
        })
    }

    /// Decodes a record from an X.509 extension of a supported kind.
    pub fn from_x509_extension(ext: &Extension) -> Result<Self, SelfCertError> {
        let value = ext.extn_value.as_bytes();
        let oid = ext.extn_id;
        let record = if oid == BasicConstraints::OID {
            ExtensionRecord::BasicConstraints(BasicConstraints::from_x509_extension_value(value)?)
        } else if oid == KeyUsage::OID {
            ExtensionRecord::KeyUsage(KeyUsage::from_x509_extension_value(value)?)
        } else if oid == ExtendedKeyUsage::OID {
            ExtensionRecord::ExtendedKeyUsage(ExtendedKeyUsage::from_x509_extension_value(value)?)
        } else if oid == NetscapeCertType::OID {
            ExtensionRecord::LegacyCertType(NetscapeCertType::from_x509_extension_value(value)?)
        } else if oid == SubjectAltName::OID {
            ExtensionRecord::SubjectAltName(SubjectAltName::from_x509_extension_value(value)?)
        } else if oid == SubjectKeyIdentifier::OID {
            ExtensionRecord::SubjectKeyIdentifier(SubjectKeyIdentifier::from_x509_extension_value(
                value,
            )?)
        } else {
            return Err(SelfCertError::UnsupportedExtensionError {
                kind: oid.to_string(),
                reason: "unknown extension".to_string(),
            });
        };
        Ok(record)
    }
}

/// Validates extension requests and builds the extension list, in request order.
///
/// The subject key identifier is computed from `subject_key`. Requesting the same
/// kind twice is rejected, as RFC 5280 allows a single instance per extension.
pub fn build_extensions(
    requests: &[ExtensionRequest],
    subject_key: &PublicKey,
) -> Result<Vec<ExtensionRecord>, SelfCertError> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .map(|request| {
            let kind = request.kind();
            if !seen.insert(kind) {
                return Err(SelfCertError::UnsupportedExtensionError {
                    kind: kind.to_string(),
                    reason: "extension requested more than once".to_string(),
                });
            }
            request.build(subject_key)
        })
        .collect()
}
