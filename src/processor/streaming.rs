//! Incremental readers for match dumps.
//!
//! Dumps come either as one huge JSON array or as one JSON object per line.
//! Both are read one match at a time; a match that fails to decode is
//! reported as `SourceItem::Malformed` and the scan carries on.

use crate::config::InputFormat;
use crate::error::{FilterError, Result};
use crate::models::RawMatch;

use std::io::BufRead;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Array elements past this size are almost always an unclosed string or
/// object swallowing the rest of the dump
const LARGE_ELEMENT_BYTES: usize = 16 * 1024 * 1024;

/// One entry read from the source
#[derive(Debug)]
pub enum SourceItem {
    Record(Box<RawMatch>),
    Malformed,
}

impl SourceItem {
    fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<RawMatch>(bytes) {
            Ok(raw) => SourceItem::Record(Box::new(raw)),
            Err(e) => {
                debug!("Skipping malformed record: {}", e);
                SourceItem::Malformed
            }
        }
    }
}

/// Streaming source of raw matches
pub struct RecordSource<R: BufRead> {
    reader: R,
    layout: Layout,
}

enum Layout {
    Array(ArrayScanner),
    Lines,
}

impl<R: BufRead> RecordSource<R> {
    /// Create a source, detecting the layout when `format` is `Auto`
    pub fn new(mut reader: R, format: InputFormat) -> Result<Self> {
        let layout = match format {
            InputFormat::Array => Layout::Array(ArrayScanner::default()),
            InputFormat::Lines => Layout::Lines,
            InputFormat::Auto => match peek_first_byte(&mut reader)? {
                Some(b'[') => Layout::Array(ArrayScanner::default()),
                _ => Layout::Lines,
            },
        };

        debug!(
            "Reading source as {}",
            match layout {
                Layout::Array(_) => "a JSON array",
                Layout::Lines => "JSON lines",
            }
        );

        Ok(Self { reader, layout })
    }

    /// Read the next entry, or `None` once the source is exhausted
    pub fn next_item(&mut self) -> Result<Option<SourceItem>> {
        match &mut self.layout {
            Layout::Array(scanner) => Ok(scanner
                .next_element(&mut self.reader)?
                .map(|bytes| SourceItem::decode(&bytes))),
            Layout::Lines => next_line_item(&mut self.reader),
        }
    }
}

/// Skip leading whitespace and a byte order mark, returning the first significant byte
fn peek_first_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    let available = reader.fill_buf()?;
    if available.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(None);
        }
        let whitespace = available
            .iter()
            .take_while(|byte| byte.is_ascii_whitespace())
            .count();
        if whitespace < available.len() {
            let first = available[whitespace];
            reader.consume(whitespace);
            return Ok(Some(first));
        }
        let consumed = available.len();
        reader.consume(consumed);
    }
}

fn next_line_item<R: BufRead>(reader: &mut R) -> Result<Option<SourceItem>> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        if line.iter().all(|byte| byte.is_ascii_whitespace()) {
            continue;
        }
        return Ok(Some(SourceItem::decode(&line)));
    }
}

/// Splits a top-level JSON array into raw element bytes
///
/// Tracks bracket depth and string state only; each element is decoded on
/// its own, so a malformed element never aborts the rest of the array.
/// An element that never closes its string or object absorbs everything up
/// to the end of the input and comes out as one malformed entry.
#[derive(Debug, Default)]
struct ArrayScanner {
    started: bool,
    finished: bool,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

enum Boundary {
    Element,
    ArrayEnd,
}

impl ArrayScanner {
    fn next_element<R: BufRead>(&mut self, reader: &mut R) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }
        if !self.started {
            match peek_first_byte(reader)? {
                Some(b'[') => reader.consume(1),
                Some(other) => {
                    return Err(FilterError::InvalidSource {
                        reason: format!(
                            "expected a JSON array, found '{}'",
                            char::from(other).escape_default()
                        ),
                    });
                }
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            }
            self.started = true;
        }

        let mut element = Vec::new();
        let mut warned = false;
        loop {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                // Unterminated array: whatever was collected is a truncated element
                self.finished = true;
                return Ok(non_blank(element));
            }

            let mut boundary = None;
            let mut consumed = 0;
            for &byte in available {
                consumed += 1;
                if let Some(found) = self.scan(byte) {
                    boundary = Some(found);
                    break;
                }
                element.push(byte);
            }
            reader.consume(consumed);

            if !warned && element.len() > LARGE_ELEMENT_BYTES {
                warn!(
                    "Array element exceeds {} MiB; the dump may contain an unterminated string or object",
                    LARGE_ELEMENT_BYTES / (1024 * 1024)
                );
                warned = true;
            }

            match boundary {
                Some(Boundary::Element) => {
                    // An empty slot such as `[1,,2]` is still an entry, just not a valid one
                    return Ok(Some(element));
                }
                Some(Boundary::ArrayEnd) => {
                    self.finished = true;
                    return Ok(non_blank(element));
                }
                None => {}
            }
        }
    }

    fn scan(&mut self, byte: u8) -> Option<Boundary> {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return None;
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' if self.depth > 0 => self.depth -= 1,
            b',' if self.depth == 0 => return Some(Boundary::Element),
            b']' => return Some(Boundary::ArrayEnd),
            _ => {}
        }
        None
    }
}

fn non_blank(element: Vec<u8>) -> Option<Vec<u8>> {
    if element.iter().all(|byte| byte.is_ascii_whitespace()) {
        None
    } else {
        Some(element)
    }
}
