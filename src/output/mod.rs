//! Report rendering.
//!
//! Renders [`HostResult`]s as a text report or pretty JSON, and turns
//! soon-to-expire certificates into accumulated warnings.

mod expiration;
mod json;
mod text;

use std::io::{self, ErrorKind, Write};

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::models::HostResult;

pub use expiration::check_expiration;
pub use json::{parse_json, write_json};
pub use text::{write_text, write_text_in};

/// Writes `results` to `writer` in `format`. [`OutputFormat::None`] writes nothing.
///
/// # Errors
///
/// Returns an error if writing or JSON encoding fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    results: &[HostResult],
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(writer, results).context("Failed to write text report")?,
        OutputFormat::Json => write_json(writer, results).context("Failed to write JSON report")?,
        OutputFormat::None => return Ok(()),
    }
    writer.flush().context("Failed to flush report")
}

/// Writer adapter that treats a closed downstream pipe as success.
///
/// Lets `certinfo ... | head` exit cleanly.
pub struct IgnoreBrokenPipe<W: Write> {
    inner: W,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(buf.len())
            } else {
                Err(e)
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_none_writes_nothing() {
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certificates: vec![],
        }];
        let mut out = Vec::new();
        write_report(&mut out, OutputFormat::None, &results).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_broken_pipe_is_ignored() {
        let mut writer = IgnoreBrokenPipe::new(ClosedPipe);
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certificates: vec![],
        }];
        write_report(&mut writer, OutputFormat::Json, &results).unwrap();
    }
}
