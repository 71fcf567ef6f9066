//! Plain text output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use photo_classify_core::{ClassificationRecord, ResultOutput};

/// Writes the display text of each record.
///
/// With several images, each block is headed by the image path and followed
/// by a blank line.
pub struct TextOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    show_paths: bool,
}

impl TextOutput {
    /// Creates a text output writing to stdout.
    #[must_use]
    pub fn stdout(show_paths: bool) -> Self {
        Self::new(Box::new(io::stdout()), show_paths)
    }

    /// Creates a text output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, show_paths: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            show_paths,
        }
    }
}

impl ResultOutput for TextOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, record: &ClassificationRecord) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        if self.show_paths {
            writeln!(writer, "{}:", record.path)?;
            writeln!(writer, "{}", record.message)?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "{}", record.message)?;
        }
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}
