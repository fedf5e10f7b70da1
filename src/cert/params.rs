use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{GeneralizedTime, PrintableStringRef, UtcTime, Utf8StringRef};
use der::{Any, Encode, Tag, Tagged};
use rand::RngCore;
use time::{Date, Month, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RelativeDistinguishedName};

use super::SignatureAlgorithm;
use super::extensions::ExtensionRequest;
use crate::error::{Result, SelfCertError};
use crate::key::KeyAlgorithm;

/// Parameters for issuing a self-signed identity.
///
/// # Fields
/// * `subject` - The distinguished name used as both subject and issuer.
/// * `key_algorithm` - Algorithm of the generated key pair.
/// * `key_strength` - Key strength, the modulus size in bits for RSA.
/// * `serial_number` - The certificate serial number.
/// * `validity_years` - Number of calendar years the certificate is valid for.
/// * `not_before` - Start of the validity window, defaults to now.
/// * `signature_algorithm` - Algorithm used for the self-signature.
/// * `extensions` - Requested extensions, in output order.
#[derive(Clone, Debug, Builder)]
pub struct IdentityParams {
    pub subject: DistinguishedName,
    #[builder(default)]
    pub key_algorithm: KeyAlgorithm,
    #[builder(default = 2048)]
    pub key_strength: usize,
    #[builder(default = SerialNumber::one())]
    pub serial_number: SerialNumber,
    #[builder(default = 1)]
    pub validity_years: u32,
    pub not_before: Option<OffsetDateTime>,
    #[builder(default)]
    pub signature_algorithm: SignatureAlgorithm,
    #[builder(default)]
    pub extensions: Vec<ExtensionRequest>,
}

/// Attribute types supported in a distinguished name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    CommonName,
    Country,
    StateOrProvince,
    Locality,
    Organization,
    OrganizationalUnit,
}

impl AttributeType {
    pub const fn oid(self) -> ObjectIdentifier {
        match self {
            AttributeType::CommonName => ObjectIdentifier::new_unwrap("2.5.4.3"),
            AttributeType::Country => ObjectIdentifier::new_unwrap("2.5.4.6"),
            AttributeType::Locality => ObjectIdentifier::new_unwrap("2.5.4.7"),
            AttributeType::StateOrProvince => ObjectIdentifier::new_unwrap("2.5.4.8"),
            AttributeType::Organization => ObjectIdentifier::new_unwrap("2.5.4.10"),
            AttributeType::OrganizationalUnit => ObjectIdentifier::new_unwrap("2.5.4.11"),
        }
    }

    /// The attribute's long name, e.g. `commonName`.
    pub const fn name(self) -> &'static str {
        match self {
            AttributeType::CommonName => "commonName",
            AttributeType::Country => "countryName",
            AttributeType::StateOrProvince => "stateOrProvinceName",
            AttributeType::Locality => "localityName",
            AttributeType::Organization => "organizationName",
            AttributeType::OrganizationalUnit => "organizationalUnitName",
        }
    }

    fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            AttributeType::CommonName,
            AttributeType::Country,
            AttributeType::StateOrProvince,
            AttributeType::Locality,
            AttributeType::Organization,
            AttributeType::OrganizationalUnit,
        ]
        .into_iter()
        .find(|ty| ty.oid() == *oid)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeType {
    type Err = SelfCertError;

    /// Accepts both the long names and the RFC 4514 short names.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "commonName" | "CN" => Ok(AttributeType::CommonName),
            "countryName" | "C" => Ok(AttributeType::Country),
            "stateOrProvinceName" | "ST" => Ok(AttributeType::StateOrProvince),
            "localityName" | "L" => Ok(AttributeType::Locality),
            "organizationName" | "O" => Ok(AttributeType::Organization),
            "organizationalUnitName" | "OU" => Ok(AttributeType::OrganizationalUnit),
            other => Err(SelfCertError::InvalidAttributeError {
                attribute: other.to_string(),
                reason: "unknown attribute type".to_string(),
            }),
        }
    }
}

/// An ordered distinguished name.
///
/// Each attribute becomes its own single-valued RDN, in insertion order. Duplicate
/// attribute types are kept as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    attrs: Vec<(AttributeType, String)>,
}

impl DistinguishedName {
    /// Builds a distinguished name from an ordered attribute list.
    ///
    /// Every value must be non-blank. `countryName` must additionally be a valid
    /// PrintableString, which is how it is encoded.
    pub fn build<I, V>(attrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (AttributeType, V)>,
        V: Into<String>,
    {
        let attrs = attrs
            .into_iter()
            .map(|(ty, value)| {
                let value = value.into();
                validate_attribute(ty, &value)?;
                Ok((ty, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { attrs })
    }

    pub fn attributes(&self) -> &[(AttributeType, String)] {
        &self.attrs
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Returns the first value of the given attribute type.
    pub fn get(&self, ty: AttributeType) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, v)| v.as_str())
    }

    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<Name> {
        let rdns = self
            .attrs
            .iter()
            .map(|(ty, value)| {
                let atv = AttributeTypeAndValue {
                    oid: ty.oid(),
                    value: attribute_value(*ty, value)?,
                };
                Ok(RelativeDistinguishedName::try_from(vec![atv])?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Name::from(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509 name.
    ///
    /// Only the attribute types listed in [`AttributeType`] with string values are
    /// understood.
    pub fn from_x509_name(name: &Name) -> Result<Self> {
        let mut attrs = Vec::new();
        for rdn in name.0.iter() {
            for atv in rdn.0.iter() {
                let ty = AttributeType::from_oid(&atv.oid).ok_or_else(|| {
                    SelfCertError::InvalidAttributeError {
                        attribute: atv.oid.to_string(),
                        reason: "unknown attribute type".to_string(),
                    }
                })?;
                let value = match atv.value.tag() {
                    Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
                        String::from_utf8(atv.value.value().to_vec()).map_err(|e| {
                            SelfCertError::InvalidAttributeError {
                                attribute: ty.to_string(),
                                reason: e.to_string(),
                            }
                        })?
                    }
                    tag => {
                        return Err(SelfCertError::InvalidAttributeError {
                            attribute: ty.to_string(),
                            reason: format!("unsupported string type {tag}"),
                        });
                    }
                };
                attrs.push((ty, value));
            }
        }
        Ok(Self { attrs })
    }
}

fn validate_attribute(ty: AttributeType, value: &str) -> Result<()> {
    let invalid = |reason: String| SelfCertError::InvalidAttributeError {
        attribute: ty.to_string(),
        reason,
    };
    if value.trim().is_empty() {
        return Err(invalid("value must not be empty".to_string()));
    }
    if ty == AttributeType::Country {
        PrintableStringRef::new(value)
            .map_err(|e| invalid(format!("not a printable string: {e}")))?;
    }
    Ok(())
}

fn attribute_value(ty: AttributeType, value: &str) -> Result<Any> {
    let any = match ty {
        AttributeType::Country => Any::new(Tag::PrintableString, value.as_bytes())?,
        _ => Any::from(Utf8StringRef::new(value)?),
    };
    Ok(any)
}

/// Certificate validity period.
///
/// Both bounds are truncated to whole seconds, the precision X.509 encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidityWindow {
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl ValidityWindow {
    /// Creates a validity window, failing if `not_before` is after `not_after`.
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Result<Self> {
        let not_before = truncate_to_seconds(not_before)?;
        let not_after = truncate_to_seconds(not_after)?;
        if not_before > not_after {
            return Err(SelfCertError::InvalidValidityWindowError(format!(
                "not before {not_before} is later than not after {not_after}"
            )));
        }
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Creates a validity window of `years` calendar years starting at `not_before`.
    ///
    /// A start on February 29th ends on February 28th when the target year is not a
    /// leap year.
    pub fn for_years(not_before: OffsetDateTime, years: u32) -> Result<Self> {
        let not_after = add_years(not_before, years)?;
        Self::new(not_before, not_after)
    }

    /// Creates a validity window starting now for the given number of years.
    pub fn from_now(years: u32) -> Result<Self> {
        Self::for_years(OffsetDateTime::now_utc(), years)
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// Converts to the X.509 representation, UTCTime through 2049 and
    /// GeneralizedTime afterwards.
    pub fn to_x509_validity(&self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        })
    }
}

fn truncate_to_seconds(dt: OffsetDateTime) -> Result<OffsetDateTime> {
    dt.replace_nanosecond(0)
        .map_err(|e| SelfCertError::InvalidValidityWindowError(e.to_string()))
}

fn add_years(dt: OffsetDateTime, years: u32) -> Result<OffsetDateTime> {
    let out_of_range =
        || SelfCertError::InvalidValidityWindowError(format!("{dt} plus {years} years"));
    let year = i32::try_from(years)
        .ok()
        .and_then(|y| dt.year().checked_add(y))
        .ok_or_else(out_of_range)?;
    let day = if dt.month() == Month::February && dt.day() == 29 && !time::util::is_leap_year(year)
    {
        28
    } else {
        dt.day()
    };
    let date = Date::from_calendar_date(year, dt.month(), day)
        .map_err(|e| SelfCertError::InvalidValidityWindowError(e.to_string()))?;
    Ok(dt.replace_date(date))
}

fn to_x509_time(dt: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let secs = u64::try_from(dt.unix_timestamp()).map_err(|_| {
        SelfCertError::InvalidValidityWindowError(format!("{dt} predates the unix epoch"))
    })?;
    let duration = Duration::from_secs(secs);
    let time = if dt.year() < 2050 {
        x509_cert::time::Time::UtcTime(UtcTime::from_unix_duration(duration)?)
    } else {
        x509_cert::time::Time::GeneralTime(GeneralizedTime::from_unix_duration(duration)?)
    };
    Ok(time)
}

/// A positive certificate serial number of arbitrary precision.
///
/// Stored as its minimal unsigned big-endian magnitude.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialNumber(Vec<u8>);

impl SerialNumber {
    /// RFC 5280 caps serial numbers at 20 octets.
    pub const MAX_LEN: usize = 20;

    /// The serial number `1`.
    pub fn one() -> Self {
        Self(vec![1])
    }

    /// Creates a serial number from unsigned big-endian bytes.
    ///
    /// Leading zero bytes are stripped. Zero is rejected since serials must be positive.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let start = bytes.iter().position(|b| *b != 0).ok_or_else(|| {
            SelfCertError::InvalidSerialNumberError("serial number must be positive".to_string())
        })?;
        let magnitude = &bytes[start..];
        let encoded_len = magnitude.len() + usize::from(magnitude[0] & 0x80 != 0);
        if encoded_len > Self::MAX_LEN {
            return Err(SelfCertError::InvalidSerialNumberError(format!(
                "serial number encodes to {encoded_len} octets, at most {} allowed",
                Self::MAX_LEN
            )));
        }
        Ok(Self(magnitude.to_vec()))
    }

    /// Generates a random 16 byte serial number with the high bit cleared.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        bytes[0] &= 0x7F;
        bytes[0] |= 0x01;
        Self(bytes.to_vec())
    }

    /// The minimal unsigned big-endian magnitude.
    pub fn magnitude(&self) -> &[u8] {
        &self.0
    }

    /// The DER INTEGER contents: the magnitude, prefixed with a zero byte when its
    /// high bit would otherwise read as a sign bit.
    pub fn to_signed_be_bytes(&self) -> Vec<u8> {
        let magnitude = self.magnitude();
        let mut out = Vec::with_capacity(magnitude.len() + 1);
        if magnitude[0] & 0x80 != 0 {
            out.push(0);
        }
        out.extend_from_slice(magnitude);
        out
    }

    pub fn to_x509_serial(&self) -> Result<x509_cert::serial_number::SerialNumber> {
        x509_cert::serial_number::SerialNumber::new(&self.to_signed_be_bytes())
            .map_err(|e| SelfCertError::InvalidSerialNumberError(e.to_string()))
    }
}

impl TryFrom<u64> for SerialNumber {
    type Error = SelfCertError;

    fn try_from(value: u64) -> Result<Self> {
        Self::from_be_bytes(&value.to_be_bytes())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.magnitude() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// DER encoding of a name, used to compare subject and issuer byte for byte.
pub(crate) fn name_der(name: &Name) -> Result<Vec<u8>> {
    Ok(name.to_der()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn attr_at(name: &Name, index: usize) -> &AttributeTypeAndValue {
        name.0[index].0.iter().next().unwrap()
    }

    fn example_dn() -> DistinguishedName {
        DistinguishedName::build([
            (AttributeType::CommonName, "example.org"),
            (AttributeType::Country, "US"),
            (AttributeType::StateOrProvince, "Virginia"),
            (AttributeType::Locality, "Blacksburg"),
            (AttributeType::Organization, "Test"),
            (AttributeType::OrganizationalUnit, "Test"),
        ])
        .unwrap()
    }

    #[test]
    fn test_dn_preserves_order_and_duplicates() {
        let dn = DistinguishedName::build([
            (AttributeType::OrganizationalUnit, "b"),
            (AttributeType::CommonName, "a"),
            (AttributeType::OrganizationalUnit, "c"),
        ])
        .unwrap();
        let name = dn.as_x509_name().unwrap();
        assert_eq!(name.0.len(), 3);
        assert_eq!(attr_at(&name, 0).oid, AttributeType::OrganizationalUnit.oid());
        assert_eq!(attr_at(&name, 1).oid, AttributeType::CommonName.oid());
        assert_eq!(attr_at(&name, 2).oid, AttributeType::OrganizationalUnit.oid());

        let decoded = DistinguishedName::from_x509_name(&name).unwrap();
        assert_eq!(decoded, dn);
    }

    #[test]
    fn test_dn_encoding_is_stable() {
        let first = name_der(&example_dn().as_x509_name().unwrap()).unwrap();
        let second = name_der(&example_dn().as_x509_name().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dn_rejects_empty_value() {
        let err = DistinguishedName::build([
            (AttributeType::CommonName, "example.org"),
            (AttributeType::Locality, "  "),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SelfCertError::InvalidAttributeError {
                attribute: "localityName".to_string(),
                reason: "value must not be empty".to_string(),
            }
        );
    }

    #[test]
    fn test_dn_rejects_non_printable_country() {
        let err = DistinguishedName::build([(AttributeType::Country, "U@")]).unwrap_err();
        assert!(matches!(err, SelfCertError::InvalidAttributeError { .. }));
    }

    #[test]
    fn test_country_is_printable_string() {
        let name = example_dn().as_x509_name().unwrap();
        assert_eq!(attr_at(&name, 0).value.tag(), Tag::Utf8String);
        assert_eq!(attr_at(&name, 1).value.tag(), Tag::PrintableString);
    }

    #[test]
    fn test_attribute_type_from_str() {
        assert_eq!("ST".parse::<AttributeType>().unwrap(), AttributeType::StateOrProvince);
        assert_eq!(
            "organizationalUnitName".parse::<AttributeType>().unwrap(),
            AttributeType::OrganizationalUnit
        );
        assert!("emailAddress".parse::<AttributeType>().is_err());
    }

    #[test]
    fn test_validity_leap_day_is_clamped() {
        let validity = ValidityWindow::for_years(datetime!(2024-02-29 12:30:00 UTC), 1).unwrap();
        assert_eq!(validity.not_after(), datetime!(2025-02-28 12:30:00 UTC));

        let validity = ValidityWindow::for_years(datetime!(2024-02-29 12:30:00 UTC), 4).unwrap();
        assert_eq!(validity.not_after(), datetime!(2028-02-29 12:30:00 UTC));
    }

    #[test]
    fn test_validity_adds_calendar_years() {
        let validity = ValidityWindow::for_years(datetime!(2023-03-01 00:00:00 UTC), 1).unwrap();
        assert_eq!(validity.not_after(), datetime!(2024-03-01 00:00:00 UTC));

        let validity = ValidityWindow::for_years(datetime!(2025-07-15 08:00:00 UTC), 0).unwrap();
        assert_eq!(validity.not_before(), validity.not_after());
    }

    #[test]
    fn test_validity_truncates_subseconds() {
        let validity =
            ValidityWindow::for_years(datetime!(2024-01-01 00:00:00.75 UTC), 1).unwrap();
        assert_eq!(validity.not_before(), datetime!(2024-01-01 00:00:00 UTC));
    }

    #[test]
    fn test_validity_rejects_inverted_window() {
        let err = ValidityWindow::new(
            datetime!(2025-01-01 00:00:00 UTC),
            datetime!(2024-01-01 00:00:00 UTC),
        )
        .unwrap_err();
        assert!(matches!(err, SelfCertError::InvalidValidityWindowError(_)));
    }

    #[test]
    fn test_validity_switches_to_generalized_time() {
        let validity = ValidityWindow::for_years(datetime!(2049-06-01 00:00:00 UTC), 1).unwrap();
        let x509 = validity.to_x509_validity().unwrap();
        assert!(matches!(x509.not_before, x509_cert::time::Time::UtcTime(_)));
        assert!(matches!(x509.not_after, x509_cert::time::Time::GeneralTime(_)));
    }

    #[test]
    fn test_serial_number_minimal_encoding() {
        let serial = SerialNumber::from_be_bytes(&[0, 0, 0x80]).unwrap();
        assert_eq!(serial.magnitude(), &[0x80]);
        assert_eq!(serial.to_signed_be_bytes(), vec![0x00, 0x80]);
        assert_eq!(
            serial.to_x509_serial().unwrap().to_der().unwrap(),
            vec![0x02, 0x02, 0x00, 0x80]
        );

        assert_eq!(SerialNumber::one().to_signed_be_bytes(), vec![0x01]);
        assert_eq!(SerialNumber::try_from(1u64).unwrap(), SerialNumber::one());
        assert_eq!(
            SerialNumber::try_from(0xbeef_u64).unwrap().to_signed_be_bytes(),
            vec![0x00, 0xbe, 0xef]
        );
    }

    #[test]
    fn test_serial_number_rejects_zero_and_overlong() {
        assert!(matches!(
            SerialNumber::from_be_bytes(&[0, 0]),
            Err(SelfCertError::InvalidSerialNumberError(_))
        ));
        assert!(SerialNumber::try_from(0u64).is_err());
        assert!(SerialNumber::from_be_bytes(&[0x7f; 20]).is_ok());
        assert!(SerialNumber::from_be_bytes(&[0xff; 20]).is_err());
    }

    #[test]
    fn test_random_serial_is_positive() {
        let serial = SerialNumber::random();
        assert_eq!(serial.magnitude().len(), 16);
        assert_eq!(serial.magnitude()[0] & 0x80, 0);
        assert_ne!(serial, SerialNumber::random());
    }
}
