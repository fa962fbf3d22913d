use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use cotizador_core::provider::QuoteSink;
use cotizador_core::record::QuoteRecord;
use cotizador_core::{QuoteEngineResult, QuoteError};

/// Appends one JSON object per quote to a file.
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuoteSink for JsonLinesSink {
    fn store(&mut self, record: &QuoteRecord) -> QuoteEngineResult<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &std::path::Path, e: std::io::Error) -> QuoteError {
    QuoteError::InvalidInput {
        field: "save".into(),
        reason: format!("cannot write '{}': {}", path.display(), e),
    }
}
