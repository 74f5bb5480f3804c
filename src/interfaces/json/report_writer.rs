use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Outcome of mounting the client consumers.
#[derive(Debug, Serialize, PartialEq)]
pub struct ClientReport {
    pub manual_client_load: bool,
    pub components: usize,
    /// Consumers that ended up holding a handle.
    pub resolved: usize,
    pub loader_invocations: usize,
    pub cached: bool,
}

/// Outcome of one simulated server request.
#[derive(Debug, Serialize, PartialEq)]
pub struct RequestReport {
    pub request_id: String,
    pub path: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Report {
    pub client: ClientReport,
    pub requests: Vec<RequestReport>,
}

/// Writes the run report as a single JSON line.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
