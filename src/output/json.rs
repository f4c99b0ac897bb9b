//! JSON report.

use std::io::{Read, Write};

use anyhow::{Context, Result};

use crate::models::HostResult;

/// Writes `results` as a pretty-printed JSON array followed by a newline.
pub fn write_json<W: Write>(writer: &mut W, results: &[HostResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, results)?;
    writeln!(writer)?;
    Ok(())
}

/// Reads a report produced by [`write_json`].
///
/// # Errors
///
/// Returns an error if the input is not a JSON array of host results.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<HostResult>> {
    serde_json::from_reader(reader).context("Failed to parse JSON report")
}
