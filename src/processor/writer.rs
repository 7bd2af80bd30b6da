//! JSON-lines writer for normalized records.

use crate::error::Result;
use crate::models::NormalizedRecord;
use std::io::{BufWriter, Write};

/// Writes one normalized record per line through a buffered sink
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: BufWriter::new(sink),
            written: 0,
        }
    }

    /// Serialize a record and terminate it with a newline
    pub fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered output and hand back the number of records written
    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        Ok(self.written)
    }
}
