#![allow(dead_code)]

use selfcert::cert::extensions::ExtensionRequest;
use selfcert::cert::params::{AttributeType, DistinguishedName, IdentityParams, SerialNumber};
use selfcert::issuer::{IssuedIdentity, issue_self_signed};

pub const WEBID: &str = "http://example.org/webid#me";

pub fn reference_subject() -> DistinguishedName {
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

/// The reference identity: RSA-2048, serial 1, one year, the full extension profile.
pub fn reference_params() -> IdentityParams {
    IdentityParams::builder()
        .subject(reference_subject())
        .serial_number(SerialNumber::one())
        .validity_years(1)
        .extensions(ExtensionRequest::identity_profile(WEBID))
        .build()
}

pub fn issue_reference() -> IssuedIdentity {
    issue_self_signed(&reference_params()).unwrap()
}
