//! Line-oriented text report.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::config::{NO_DNS_NAMES_PLACEHOLDER, TEXT_DATE_FORMAT};
use crate::models::HostResult;

/// Writes the text report with timestamps in the local time zone.
pub fn write_text<W: Write>(writer: &mut W, results: &[HostResult]) -> io::Result<()> {
    write_text_in(writer, results, &Local)
}

/// Writes the text report with timestamps in `tz`.
pub fn write_text_in<W, Tz>(writer: &mut W, results: &[HostResult], tz: &Tz) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Host: {}", result.authority())?;
        writeln!(writer, "Certs:")?;
        for cert in &result.certificates {
            writeln!(
                writer,
                "    Issuer:     {} ({})",
                cert.issuer_common_name,
                cert.issuer_organization.join(", ")
            )?;
            writeln!(writer, "    Subject:    {}", cert.subject_common_name)?;
            writeln!(writer, "    Not Before: {}", format_time(&cert.not_before, tz))?;
            writeln!(writer, "    Not After:  {}", format_time(&cert.not_after, tz))?;
            let dns_names = if cert.dns_names.is_empty() {
                NO_DNS_NAMES_PLACEHOLDER.to_string()
            } else {
                cert.dns_names.join(" ")
            };
            writeln!(writer, "    DNS names:  {dns_names}")?;
        }
    }
    Ok(())
}

fn format_time<Tz>(time: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.with_timezone(tz).format(TEXT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CertificateRecord;
    use chrono::FixedOffset;

    fn record(dns_names: Vec<&str>) -> CertificateRecord {
        CertificateRecord {
            issuer_common_name: "R11".to_string(),
            issuer_organization: vec!["Let's Encrypt".to_string()],
            subject_common_name: "example.com".to_string(),
            not_before: Utc.with_ymd_and_hms(2026, 8, 1, 6, 5, 4).unwrap(),
            not_after: Utc.with_ymd_and_hms(2026, 10, 30, 23, 59, 59).unwrap(),
            dns_names: dns_names.into_iter().map(str::to_string).collect(),
        }
    }

    fn render(results: &[HostResult], tz: &impl TimeZone<Offset = impl Display>) -> String {
        let mut out = Vec::new();
        write_text_in(&mut out, results, tz).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_host() {
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certificates: vec![record(vec!["example.com", "www.example.com"])],
        }];
        assert_eq!(
            render(&results, &Utc),
            "Host: example.com:443\n\
             Certs:\n    \
             Issuer:     R11 (Let's Encrypt)\n    \
             Subject:    example.com\n    \
             Not Before: Saturday, 1 August 2026 at 06:05:04 (+00:00)\n    \
             Not After:  Friday, 30 October 2026 at 23:59:59 (+00:00)\n    \
             DNS names:  example.com www.example.com\n"
        );
    }

    #[test]
    fn test_time_zone_applied() {
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certificates: vec![record(vec![])],
        }];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let text = render(&results, &tz);
        assert!(text.contains("Not After:  Saturday, 31 October 2026 at 01:59:59 (+02:00)"));
    }

    #[test]
    fn test_placeholder_and_host_separation() {
        let results = vec![
            HostResult {
                host: "a.example".to_string(),
                port: 443,
                certificates: vec![record(vec![])],
            },
            HostResult {
                host: "::1".to_string(),
                port: 8443,
                certificates: vec![],
            },
        ];
        let text = render(&results, &Utc);
        assert!(text.contains("    DNS names:  \u{2014}\n"));
        assert!(text.ends_with("\nHost: [::1]:8443\nCerts:\n"));
        assert!(text.contains("\n\nHost: [::1]:8443"));
    }
}
