//! Common CLI types and output helpers shared across commands.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tabwriter::TabWriter;

/// Output format for tabular/structured data.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default for interactive use)
    #[default]
    Table,
    /// JSON object or array (pipe-friendly, structured)
    Json,
    /// JSON Lines - one JSON object per line (streaming-friendly)
    Jsonl,
    /// Comma-separated values (pipe to awk/cut/etc)
    Csv,
}

impl OutputFormat {
    /// Returns true if this format is machine-readable (suitable for piping)
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json | Self::Jsonl | Self::Csv)
    }
}

/// Write data as JSON to the given writer.
pub fn write_json<W: Write, T: Serialize>(
    data: &T,
    writer: &mut W,
    pretty: bool,
) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, data).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut *writer, data).map_err(io::Error::other)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write data as JSON Lines (one JSON object per line) to the given writer.
pub fn write_jsonl<W: Write, T: Serialize>(data: &[T], writer: &mut W) -> io::Result<()> {
    for item in data {
        serde_json::to_writer(&mut *writer, item).map_err(io::Error::other)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Write JSON array data as CSV to the given writer.
/// Assumes all objects have the same keys.
pub fn write_csv_from_json<W: Write>(data: &[serde_json::Value], writer: &mut W) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let headers: Vec<&str> = match data[0].as_object() {
        Some(obj) => obj.keys().map(|s| s.as_str()).collect(),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Expected JSON objects",
            ))
        }
    };

    writeln!(writer, "{}", headers.join(","))?;

    for item in data {
        if let Some(obj) = item.as_object() {
            let values: Vec<String> = headers
                .iter()
                .map(|h| obj.get(*h).map(csv_cell).unwrap_or_default())
                .collect();
            writeln!(writer, "{}", values.join(","))?;
        }
    }
    Ok(())
}

fn csv_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => {
            // Quote cells containing separators, quotes or line breaks
            if s.contains(&[',', '"', '\n', '\r'][..]) {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write a tab-aligned table with a header row.
pub fn write_table<W: Write>(header: &[&str], rows: &[Vec<String>], writer: W) -> io::Result<()> {
    let mut tw = TabWriter::new(writer);
    writeln!(tw, "{}", header.join("\t"))?;
    for row in rows {
        writeln!(tw, "{}", row.join("\t"))?;
    }
    tw.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_machine_readable() {
        assert!(!OutputFormat::Table.is_machine_readable());
        assert!(OutputFormat::Json.is_machine_readable());
        assert!(OutputFormat::Jsonl.is_machine_readable());
        assert!(OutputFormat::Csv.is_machine_readable());
    }

    #[test]
    fn test_write_jsonl_to_string() {
        let data = vec![
            serde_json::json!({"metric": "orders", "value": 250.0}),
            serde_json::json!({"metric": "revenue", "value": 37500000.0}),
        ];
        let mut output = Vec::new();
        write_jsonl(&data, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert_eq!(result.lines().count(), 2);
        assert!(result.contains("revenue"));
    }

    #[test]
    fn test_write_csv_quotes_commas() {
        let data = vec![serde_json::json!({"display": "37,500,000", "metric": "revenue"})];
        let mut output = Vec::new();
        write_csv_from_json(&data, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert_eq!(result, "display,metric\n\"37,500,000\",revenue\n");
    }

    #[test]
    fn test_write_csv_quotes_line_breaks() {
        let data = vec![serde_json::json!({"id": "aov", "why": "Easiest lever\non revenue"})];
        let mut output = Vec::new();
        write_csv_from_json(&data, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert_eq!(result, "id,why\naov,\"Easiest lever\non revenue\"\n");
    }

    #[test]
    fn test_write_table_aligns_columns() {
        let mut output = Vec::new();
        write_table(
            &["METRIC", "VALUE"],
            &[vec!["Orders".into(), "250".into()]],
            &mut output,
        )
        .unwrap();
        let result = String::from_utf8(output).unwrap();
        assert!(result.starts_with("METRIC"));
        assert!(result.contains("Orders"));
    }
}
