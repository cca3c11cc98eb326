//! [`Transcript`]: the persisted copy of everything the build printed.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only sink for build output.
pub struct Transcript {
    sink: Box<dyn Write + Send>,
    bytes_written: u64,
}

impl Transcript {
    /// Create (or truncate) the transcript file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create transcript: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }

    /// Write to an arbitrary sink.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            bytes_written: 0,
        }
    }

    /// Discard everything.
    pub fn disabled() -> Self {
        Self::new(std::io::sink())
    }

    /// Append a chunk and flush it through.
    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.sink
            .write_all(chunk)
            .context("Failed to write transcript")?;
        self.sink.flush().context("Failed to flush transcript")?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
