//! Streaming output helpers for query results.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

/// Write results as a prettified JSON array.
pub fn write_json_pretty<T: Serialize>(results: &[T], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write results as newline-delimited JSON (NDJSON).
pub fn write_ndjson<T: Serialize>(results: &[T], mut w: impl Write) -> Result<()> {
    for item in results {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Write one result per line.
pub fn write_plain<T: Display>(results: &[T], mut w: impl Write) -> Result<()> {
    for item in results {
        writeln!(w, "{item}")?;
    }
    Ok(())
}
