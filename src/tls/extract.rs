//! Certificate extraction utilities.

use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::time::ASN1Time;
use x509_parser::x509::X509Name;

use crate::models::CertificateRecord;

/// Decodes a DER certificate into a record.
///
/// Returns `Ok(None)` for CA certificates, which are never reported.
pub(crate) fn certificate_record(der: &[u8]) -> Result<Option<CertificateRecord>, String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| e.to_string())?;
    if cert.is_ca() {
        return Ok(None);
    }

    Ok(Some(CertificateRecord {
        issuer_common_name: first_common_name(cert.issuer()),
        issuer_organization: cert
            .issuer()
            .iter_organization()
            .filter_map(|attr| attr.as_str().ok())
            .map(str::to_string)
            .collect(),
        subject_common_name: first_common_name(cert.subject()),
        not_before: to_utc(&cert.validity().not_before)?,
        not_after: to_utc(&cert.validity().not_after)?,
        dns_names: extract_dns_names(&cert),
    }))
}

fn first_common_name(name: &X509Name<'_>) -> String {
    name.iter_common_name()
        .find_map(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn to_utc(time: &ASN1Time) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| format!("validity timestamp {} out of range", time.timestamp()))
}

/// DNS names from the Subject Alternative Name extension. Other name types
/// (IP addresses, e-mail, URIs) are ignored.
fn extract_dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    names.push(dns_name.to_string());
                }
            }
        }
    }
    names
}
