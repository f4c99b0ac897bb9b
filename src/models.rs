use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::target::HostSpec;

/// Display-oriented projection of one non-CA peer certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Issuer common name (empty when the issuer has none)
    pub issuer_common_name: String,
    /// Issuer organization values, in certificate order
    pub issuer_organization: Vec<String>,
    /// Subject common name (empty when the subject has none)
    pub subject_common_name: String,
    /// Start of the validity period
    pub not_before: DateTime<Utc>,
    /// End of the validity period
    pub not_after: DateTime<Utc>,
    /// DNS entries of the Subject Alternative Name extension
    pub dns_names: Vec<String>,
}

/// Certificates harvested from one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    /// Host as dialed, without brackets
    pub host: String,
    /// Port as dialed
    pub port: u16,
    /// Non-CA certificates in the order the peer presented them
    #[serde(rename = "certs", default)]
    pub certificates: Vec<CertificateRecord>,
}

impl HostResult {
    /// Creates a result for `target` holding `certificates`.
    pub fn new(target: &HostSpec, certificates: Vec<CertificateRecord>) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            certificates,
        }
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn authority(&self) -> String {
        crate::target::join_host_port(&self.host, self.port)
    }
}
