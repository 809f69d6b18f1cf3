//! Row rendering.
//!
//! Text output is the comma-separated listing:
//!
//! ```text
//! node_identifier, base_url, mn_type, mn_version, mn_status
//! urn:node:KNB, https://knb.ecoinformatics.org/knb/d1/mn, Metacat, 2.19.0, up
//! ```
//!
//! `json` prints one array once every node has been probed; `text` and
//! `jsonl` print each row as soon as its probe finishes.

use anyhow::Result;
use clap::ValueEnum;
use hola_core::NodeReport;
use serde_json::Value;
use std::io::Write;

/// Column names, in output order.
pub const COLUMNS: [&str; 5] = [
    "node_identifier",
    "base_url",
    "mn_type",
    "mn_version",
    "mn_status",
];

const STATUS_COLUMN: &str = "mn_status";

/// Output format for the node listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated text with a header line (default)
    Text,
    /// Single JSON array
    Json,
    /// Newline-delimited JSON
    Jsonl,
}

/// Writes node reports to `out` in the chosen format.
pub struct RowWriter<W: Write> {
    out: W,
    format: OutputFormat,
    show_status: bool,
    buffered: Vec<Value>,
}

impl<W: Write> RowWriter<W> {
    /// Create a writer; nothing is written until [`RowWriter::begin`].
    pub const fn new(out: W, format: OutputFormat, show_status: bool) -> Self {
        Self {
            out,
            format,
            show_status,
            buffered: Vec::new(),
        }
    }

    /// Emit the header line (text only).
    pub fn begin(&mut self) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{}", header(self.show_status))?;
        }
        Ok(())
    }

    /// Emit one row, immediately unless the format is `json`.
    pub fn write(&mut self, report: &NodeReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{}", text_row(report, self.show_status))?;
                self.out.flush()?;
            },
            OutputFormat::Jsonl => {
                let value = json_row(report, self.show_status)?;
                writeln!(self.out, "{}", serde_json::to_string(&value)?)?;
                self.out.flush()?;
            },
            OutputFormat::Json => self.buffered.push(json_row(report, self.show_status)?),
        }
        Ok(())
    }

    /// Flush anything held back (the JSON array).
    pub fn finish(mut self) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.out, &self.buffered)?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Header line for text output.
pub fn header(show_status: bool) -> String {
    let columns = if show_status {
        &COLUMNS[..]
    } else {
        &COLUMNS[..COLUMNS.len() - 1]
    };
    columns.join(", ")
}

/// One text row.
pub fn text_row(report: &NodeReport, show_status: bool) -> String {
    let mut row = format!(
        "{}, {}, {}, {}",
        report.identifier, report.base_url, report.server_type, report.version
    );
    if show_status {
        row.push_str(", ");
        row.push_str(report.status.as_str());
    }
    row
}

fn json_row(report: &NodeReport, show_status: bool) -> Result<Value> {
    let mut value = serde_json::to_value(report)?;
    if !show_status {
        if let Value::Object(map) = &mut value {
            map.remove(STATUS_COLUMN);
        }
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hola_core::{NodeRecord, NodeStatus, ProbeResult, ServerType};

    fn report(version: Option<&str>, status: NodeStatus) -> NodeReport {
        let node = NodeRecord::new("urn:node:KNB", "https://knb.example.org/knb/d1/mn");
        let result = ProbeResult::new(ServerType::Metacat, version.map(str::to_string), status);
        NodeReport::new(&node, result)
    }

    fn render(format: OutputFormat, show_status: bool, reports: &[NodeReport]) -> String {
        let mut buf = Vec::new();
        let mut writer = RowWriter::new(&mut buf, format, show_status);
        writer.begin().unwrap();
        for r in reports {
            writer.write(r).unwrap();
        }
        writer.finish().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header() {
        assert_eq!(
            header(true),
            "node_identifier, base_url, mn_type, mn_version, mn_status"
        );
        assert_eq!(header(false), "node_identifier, base_url, mn_type, mn_version");
    }

    #[test]
    fn test_text_output() {
        let out = render(
            OutputFormat::Text,
            true,
            &[
                report(Some("2.19.0"), NodeStatus::Up),
                report(None, NodeStatus::Down),
            ],
        );
        assert_eq!(
            out,
            "node_identifier, base_url, mn_type, mn_version, mn_status\n\
             urn:node:KNB, https://knb.example.org/knb/d1/mn, Metacat, 2.19.0, up\n\
             urn:node:KNB, https://knb.example.org/knb/d1/mn, Metacat, Unknown, down\n"
        );
    }

    #[test]
    fn test_text_output_without_status() {
        let out = render(OutputFormat::Text, false, &[report(Some("2.1.0"), NodeStatus::Up)]);
        assert_eq!(
            out.lines().nth(1),
            Some("urn:node:KNB, https://knb.example.org/knb/d1/mn, Metacat, 2.1.0")
        );
    }

    #[test]
    fn test_text_output_header_only_when_empty() {
        let out = render(OutputFormat::Text, true, &[]);
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_json_output() {
        let out = render(OutputFormat::Json, true, &[report(Some("2.1.0"), NodeStatus::Up)]);
        let value: Value = serde_json::from_str(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["node_identifier"], "urn:node:KNB");
        assert_eq!(rows[0]["mn_type"], "Metacat");
        assert_eq!(rows[0]["mn_version"], "2.1.0");
        assert_eq!(rows[0]["mn_status"], "up");

        let empty = render(OutputFormat::Json, true, &[]);
        assert_eq!(serde_json::from_str::<Value>(&empty).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_jsonl_output_without_status() {
        let out = render(
            OutputFormat::Jsonl,
            false,
            &[
                report(Some("2.1.0"), NodeStatus::Up),
                report(None, NodeStatus::Down),
            ],
        );
        let rows: Vec<Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["mn_version"], "Unknown");
        assert!(rows.iter().all(|row| row.get("mn_status").is_none()));
    }
}
