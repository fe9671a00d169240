//! Ready-made [`CharSink`] implementations for hosted targets.

use std::io::{self, Write};

use crate::codec::CharSink;

/// Adapts any [`io::Write`] (serial port handle, file, stdout) to a
/// [`CharSink`].
///
/// A `CharSink` cannot fail, so the first write error is latched and every
/// byte after it is dropped. [`finish`](Self::finish) reports the latched
/// error.
///
/// # Examples
///
/// ```
/// # use historing::{HistoRing, sink::WriteSink};
/// let mut ring = HistoRing::new();
/// ring.init(4, None).unwrap();
///
/// let mut sink = WriteSink::new(Vec::new());
/// ring.print(&mut sink);
/// let bytes = sink.finish().unwrap();
/// assert_eq!(bytes, b"0 init() history ring initialized\n");
/// ```
pub struct WriteSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
    written: usize,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
            written: 0,
        }
    }

    /// Bytes accepted by the writer so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Flushes the writer and hands it back, or returns the first error seen.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> CharSink for WriteSink<W> {
    fn put_char(&mut self, byte: u8) {
        if self.error.is_some() {
            return;
        }
        match self.writer.write_all(&[byte]) {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

/// Collects drained output in memory.
#[derive(Debug, Default, Clone)]
pub struct LineCollector {
    bytes: Vec<u8>,
}

impl LineCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The collected text, with invalid UTF-8 replaced.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Collected lines without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.to_text().lines().map(str::to_owned).collect()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl CharSink for LineCollector {
    #[inline]
    fn put_char(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}
