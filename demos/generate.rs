use selfcert::cert::extensions::ExtensionRequest;
use selfcert::cert::params::{AttributeType, DistinguishedName, IdentityParams};
use selfcert::error::SelfCertError;
use selfcert::issuer::issue_self_signed;

fn main() -> Result<(), SelfCertError> {
    let subject = DistinguishedName::build([
        (AttributeType::CommonName, "example.org"),
        (AttributeType::Country, "US"),
        (AttributeType::StateOrProvince, "Virginia"),
        (AttributeType::Locality, "Blacksburg"),
        (AttributeType::Organization, "Test"),
        (AttributeType::OrganizationalUnit, "Test"),
    ])?;

    // RSA-2048, serial 1, valid for one year from now
    let params = IdentityParams::builder()
        .subject(subject)
        .extensions(ExtensionRequest::identity_profile(
            "http://example.org/webid#me",
        ))
        .build();

    let identity = issue_self_signed(&params)?;

    println!("Private Key PEM:\n{}", identity.private_key_pem.as_str());
    println!("Certificate PEM:\n{}", identity.certificate_pem);

    Ok(())
}
