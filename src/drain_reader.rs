//! Reader for captured drain output.
//!
//! The ring drains to a byte sink, typically a serial port. On the host side
//! the captured text is parsed back into [`DrainedLine`]s by [`DrainReader`].

use std::fmt;

use thiserror::Error;

use crate::history_ring::HIST_NOVAL;

/// Problems found while parsing a drained line. `line` is 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: missing timestamp")]
    MissingTimestamp { line: usize },

    #[error("line {line}: invalid timestamp {text:?}")]
    InvalidTimestamp { line: usize, text: String },

    #[error("line {line}: missing origin marker \"() \"")]
    MissingOrigin { line: usize },

    #[error("line {line}: invalid data word {text:?}")]
    InvalidData { line: usize, text: String },
}

/// One parsed line of drain output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainedLine {
    pub timestamp: u32,
    pub origin: String,
    pub message: String,
    /// `None` when the line carried no data clause
    pub data: Option<u32>,
}

impl DrainedLine {
    /// The data word as it was recorded, with [`HIST_NOVAL`] for "none".
    pub fn raw_data(&self) -> u32 {
        self.data.unwrap_or(HIST_NOVAL)
    }
}

impl fmt::Display for DrainedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}() {}", self.timestamp, self.origin, self.message)?;
        if let Some(data) = self.data {
            write!(f, " 0x{:x}", data)?;
        }
        Ok(())
    }
}

/// Iterates the lines of captured drain output.
///
/// Blank lines are skipped. A message that itself ends in something shaped
/// like ` 0x<hex>` is read as carrying that data word; the output format
/// cannot tell the two apart.
///
/// # Examples
///
/// ```
/// # use historing::drain_reader::DrainReader;
/// let captured = "0 init() history ring initialized\n7 adc() sample 0x3ff\n";
/// let lines: Vec<_> = DrainReader::new(captured).collect::<Result<_, _>>().unwrap();
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[1].origin, "adc");
/// assert_eq!(lines[1].data, Some(0x3ff));
/// ```
pub struct DrainReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> DrainReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Parses every line, stopping at the first error.
    pub fn read_all(self) -> Result<Vec<DrainedLine>, ParseError> {
        self.collect()
    }
}

impl Iterator for DrainReader<'_> {
    type Item = Result<DrainedLine, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_line(line, idx + 1));
        }
        None
    }
}

/// Parses one line of drain output (without its terminator).
pub fn parse_line(line: &str, line_no: usize) -> Result<DrainedLine, ParseError> {
    let (ts_text, rest) = line
        .split_once(' ')
        .ok_or(ParseError::MissingTimestamp { line: line_no })?;
    if ts_text.is_empty() {
        return Err(ParseError::MissingTimestamp { line: line_no });
    }
    let timestamp = ts_text
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidTimestamp {
            line: line_no,
            text: ts_text.to_string(),
        })?;

    let (origin, body) = rest
        .split_once("() ")
        .ok_or(ParseError::MissingOrigin { line: line_no })?;

    let (message, data) = match body.rsplit_once(" 0x") {
        Some((message, hex)) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            let data = u32::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidData {
                line: line_no,
                text: hex.to_string(),
            })?;
            (message, Some(data))
        }
        _ => (body, None),
    };

    Ok(DrainedLine {
        timestamp,
        origin: origin.to_string(),
        message: message.to_string(),
        data,
    })
}
