use crate::domain::config::ModuleOptions;
use crate::error::Result;
use std::io::Read;

/// Reads the module options document from a JSON source.
pub struct OptionsReader<R: Read> {
    source: R,
}

impl<R: Read> OptionsReader<R> {
    /// Creates a new `OptionsReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Parses the document. Missing sections and fields fall back to defaults.
    pub fn read(self) -> Result<ModuleOptions> {
        Ok(serde_json::from_reader(self.source)?)
    }
}
