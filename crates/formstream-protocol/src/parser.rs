//! Incremental `multipart/form-data` parser.
//!
//! This module provides a stateful parser that turns a body delivered in
//! arbitrarily split chunks into discrete [`Part`]s. Bytes are accumulated
//! in a [`DecodeBuffer`] and a state machine advances as far as the buffered
//! data allows, then returns without blocking. Nothing assumes that chunk
//! boundaries line up with protocol boundaries: the opening delimiter, a
//! header line or the closing delimiter may each straddle several chunks.
//!
//! # Wire Format
//!
//! ```text
//! --boundary\r\n
//! Content-Disposition: form-data; name="field"[; filename="file.ext"]\r\n
//! [Content-Type: ...\r\n]
//! \r\n
//! <raw bytes>\r\n
//! --boundary\r\n            (repeat per part)
//! --boundary--              (terminal)
//! ```
//!
//! # Usage
//!
//! ```
//! use formstream_core::Boundary;
//! use formstream_protocol::{MultipartParser, Status};
//!
//! let boundary = Boundary::new("B").unwrap();
//! let mut parser = MultipartParser::new(boundary);
//!
//! // Feed partial data as it arrives
//! assert_eq!(parser.feed(b"--B\r\nContent-Disposition: form-data; na").unwrap(), Status::Pending);
//! assert_eq!(parser.feed(b"me=\"a\"\r\n\r\nhello\r\n--").unwrap(), Status::Pending);
//! assert_eq!(parser.feed(b"B--\r\n").unwrap(), Status::Complete);
//!
//! let parts = parser.finish().unwrap();
//! assert_eq!(parts[0].name(), "a");
//! assert_eq!(parts[0].text(), Some("hello"));
//! ```

use bytes::Bytes;
use std::collections::VecDeque;
use tracing::{debug, trace};

use formstream_core::{
    Boundary, DecoderConfig, Error, Part, Result,
    constants::{
        CLOSE_SUFFIX, CRLF, DASH_DASH, classified_delimiter_len, delimiter_len, opening_len,
    },
};

use crate::buffer::DecodeBuffer;
use crate::headers::{ContentDisposition, PartHeaders};

/// State machine states for parsing a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the opening `--boundary\r\n` line.
    Begin,

    /// Accumulating header lines until an empty line.
    ReadHeaders,

    /// Scanning the part body for the next delimiter.
    ReadBody,

    /// Terminal `--boundary--` seen; further input is ignored.
    Done,
}

/// Outcome of feeding the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// More input is needed before the terminal boundary.
    Pending,

    /// The terminal boundary has been found.
    Complete,
}

/// Name, filename and media type known once a part's headers end.
#[derive(Debug)]
struct PartMeta {
    disposition: ContentDisposition,
    content_type: Option<String>,
}

/// Location of a classified delimiter inside the buffer.
#[derive(Debug, Clone, Copy)]
struct DelimiterMatch {
    /// Offset of the leading CR; the body ends here.
    start: usize,

    /// Offset just past the `--` or CRLF suffix.
    end: usize,

    /// Whether the delimiter closes the body.
    terminal: bool,
}

/// Stateful parser for one multipart body.
///
/// # State Machine
///
/// ```text
/// ┌───────┐ --B\r\n ┌─────────────┐ empty line ┌──────────┐ \r\n--B--  ┌──────┐
/// │ Begin │────────>│ ReadHeaders │───────────>│ ReadBody │───────────>│ Done │
/// └───────┘         └─────────────┘            └──────────┘            └──────┘
///     │                    ^                        │
///     │ --B--              └────────────────────────┘
///     │ (empty body)                \r\n--B\r\n
///     └──────────────────────────────────────────────────────────────────>
/// ```
///
/// Every transition waits until the exact number of bytes it needs is
/// buffered; fewer bytes is never an error. Once [`feed`] returns an error
/// the parser should be discarded.
///
/// [`feed`]: MultipartParser::feed
#[derive(Debug)]
pub struct MultipartParser {
    boundary: Boundary,

    /// `\r\n--boundary`, precomputed for body scanning.
    delimiter: Vec<u8>,

    buffer: DecodeBuffer,

    state: ParserState,

    /// Header lines of the part being parsed.
    headers: PartHeaders,

    /// Set between the end of the headers and the end of the body.
    pending: Option<PartMeta>,

    /// Completed parts ready for extraction.
    parts: VecDeque<Part>,

    /// Parts completed so far, including drained ones.
    completed: usize,

    max_part_size: Option<usize>,

    max_parts: Option<usize>,
}

impl MultipartParser {
    /// Create a parser with the default configuration.
    pub fn new(boundary: Boundary) -> Self {
        Self::with_config(boundary, &DecoderConfig::default())
    }

    /// Create a parser with explicit buffer sizing and limits.
    pub fn with_config(boundary: Boundary, config: &DecoderConfig) -> Self {
        let mut delimiter = Vec::with_capacity(delimiter_len(boundary.len()));
        delimiter.extend_from_slice(CRLF);
        delimiter.extend_from_slice(DASH_DASH);
        delimiter.extend_from_slice(boundary.as_bytes());

        Self {
            boundary,
            delimiter,
            buffer: DecodeBuffer::new(
                config.initial_capacity,
                config.effective_growth_increment(),
            ),
            state: ParserState::Begin,
            headers: PartHeaders::new(),
            pending: None,
            parts: VecDeque::new(),
            completed: 0,
            max_part_size: config.max_part_size,
            max_parts: config.max_parts,
        }
    }

    /// Append a chunk and advance as far as the buffered bytes allow.
    ///
    /// Input received after the terminal boundary is discarded.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidBoundaryPreamble` if the body does not open with `--boundary\r\n`
    /// - `Error::MissingContentDisposition` if a part's headers lack a named disposition
    /// - `Error::PartTooLarge` / `Error::TooManyParts` when configured limits are exceeded
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Status> {
        if self.state == ParserState::Done {
            if !chunk.is_empty() {
                trace!(len = chunk.len(), "ignoring bytes after terminal boundary");
            }
            return Ok(Status::Complete);
        }

        self.buffer.write(chunk);
        self.advance()
    }

    /// Run the state machine over the currently buffered bytes.
    ///
    /// Re-entrant: calling it again without new input is a no-op.
    pub fn advance(&mut self) -> Result<Status> {
        loop {
            let progressed = match self.state {
                ParserState::Begin => self.handle_begin()?,
                ParserState::ReadHeaders => self.handle_read_headers()?,
                ParserState::ReadBody => self.handle_read_body()?,
                ParserState::Done => return Ok(Status::Complete),
            };

            if !progressed {
                return Ok(Status::Pending);
            }
        }
    }

    /// Consume the parser, returning every part not yet drained.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnterminatedBody` if the terminal boundary was never seen.
    pub fn finish(self) -> Result<Vec<Part>> {
        if self.state != ParserState::Done {
            debug!(state = ?self.state, "multipart body ended early");
            return Err(Error::UnterminatedBody);
        }
        Ok(self.parts.into())
    }

    /// Extract the next completed part, if any.
    pub fn next_part(&mut self) -> Option<Part> {
        self.parts.pop_front()
    }

    /// Iterator over all currently completed parts.
    ///
    /// Does not parse more data; call [`feed()`] first.
    ///
    /// [`feed()`]: MultipartParser::feed
    pub fn drain_parts(&mut self) -> DrainParts<'_> {
        DrainParts { parser: self }
    }

    /// Number of completed parts waiting for extraction.
    pub fn parts_available(&self) -> usize {
        self.parts.len()
    }

    /// Number of parts completed since creation.
    pub fn parts_completed(&self) -> usize {
        self.completed
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Whether the terminal boundary has been found.
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Read-only view of the decode buffer.
    pub fn buffer(&self) -> &DecodeBuffer {
        &self.buffer
    }

    /// Begin: validate `--boundary` followed by CRLF (or `--` for an empty body).
    fn handle_begin(&mut self) -> Result<bool> {
        let need = opening_len(self.boundary.len());
        let unread = self.buffer.unread();
        if unread.len() < need {
            return Ok(false);
        }

        let (marker, rest) = unread[..need].split_at(DASH_DASH.len());
        let (name, suffix) = rest.split_at(self.boundary.len());
        if marker != DASH_DASH || name != self.boundary.as_bytes() {
            return Err(Error::InvalidBoundaryPreamble);
        }

        let empty_body = if suffix == CRLF {
            false
        } else if suffix == CLOSE_SUFFIX {
            true
        } else {
            return Err(Error::InvalidBoundaryPreamble);
        };

        self.buffer.consume(need);
        if empty_body {
            self.finish_body();
        } else {
            self.headers.clear();
            self.transition(ParserState::ReadHeaders);
        }
        Ok(true)
    }

    /// ReadHeaders: collect lines until an empty one ends the section.
    fn handle_read_headers(&mut self) -> Result<bool> {
        let read = self.buffer.read_position();
        let scan = self.buffer.scan_position();

        let Some(offset) = find_crlf(self.buffer.unscanned()) else {
            // A trailing CR may be the first half of a CRLF still in flight
            let write = self.buffer.write_position();
            self.buffer.set_scan_position(write.saturating_sub(1));
            return Ok(false);
        };

        let line_end = scan + offset;
        if line_end > read {
            self.headers.push_line(self.buffer.slice(read..line_end));
            self.buffer.consume(line_end + CRLF.len() - read);
            return Ok(true);
        }

        // Empty line: headers are complete
        let disposition = self
            .headers
            .content_disposition()
            .ok_or(Error::MissingContentDisposition)?;
        let content_type = self.headers.content_type();
        self.buffer.consume(CRLF.len());

        trace!(
            name = %disposition.name,
            filename = ?disposition.filename,
            content_type = ?content_type,
            header_lines = self.headers.len(),
            "part headers parsed"
        );

        self.pending = Some(PartMeta {
            disposition,
            content_type,
        });
        self.headers.clear();
        self.transition(ParserState::ReadBody);
        Ok(true)
    }

    /// ReadBody: scan from the last checked offset for a classified delimiter.
    fn handle_read_body(&mut self) -> Result<bool> {
        let body_start = self.buffer.read_position();

        let Some(found) = self.find_delimiter() else {
            // Everything before the scan position is confirmed payload
            let confirmed = self.buffer.scan_position() - body_start;
            self.check_part_size(confirmed)?;
            return Ok(false);
        };

        let size = found.start - body_start;
        self.check_part_size(size)?;
        if let Some(max) = self.max_parts {
            if self.completed >= max {
                return Err(Error::TooManyParts { max });
            }
        }

        let meta = self.pending.take().ok_or(Error::MissingContentDisposition)?;
        let payload = Bytes::copy_from_slice(self.buffer.slice(body_start..found.start));

        let mut part = Part::new(meta.disposition.name, payload);
        if let Some(filename) = meta.disposition.filename {
            part = part.with_filename(filename);
        }
        if let Some(content_type) = meta.content_type {
            part = part.with_content_type(content_type);
        }

        debug!(name = part.name(), size, terminal = found.terminal, "part complete");
        self.parts.push_back(part);
        self.completed += 1;

        self.buffer.consume(found.end - body_start);
        self.buffer.compact();

        if found.terminal {
            self.finish_body();
        } else {
            self.transition(ParserState::ReadHeaders);
        }
        Ok(true)
    }

    /// Search `[scan, write - classified_len]` for `\r\n--boundary` followed
    /// by `--` or CRLF, persisting the scan position on a miss.
    fn find_delimiter(&mut self) -> Option<DelimiterMatch> {
        let need = classified_delimiter_len(self.boundary.len());
        let write = self.buffer.write_position();
        let scan = self.buffer.scan_position();

        if write < need || write - need < scan {
            return None;
        }
        let last = write - need;

        let data = self.buffer.as_slice();
        let mut i = scan;
        while i <= last {
            let Some(offset) = data[i..=last].iter().position(|&b| b == b'\r') else {
                break;
            };
            let start = i + offset;
            let tail = start + self.delimiter.len();

            if data[start..tail] == self.delimiter[..] {
                let suffix = &data[tail..tail + 2];
                if suffix == CLOSE_SUFFIX || suffix == CRLF {
                    return Some(DelimiterMatch {
                        start,
                        end: tail + 2,
                        terminal: suffix == CLOSE_SUFFIX,
                    });
                }
            }
            i = start + 1;
        }

        self.buffer.set_scan_position(last + 1);
        None
    }

    fn check_part_size(&self, size: usize) -> Result<()> {
        match self.max_part_size {
            Some(max) if size > max => Err(Error::PartTooLarge { size, max }),
            _ => Ok(()),
        }
    }

    /// Enter Done and release buffered epilogue bytes.
    fn finish_body(&mut self) {
        self.buffer.clear();
        self.transition(ParserState::Done);
    }

    fn transition(&mut self, next: ParserState) {
        trace!(from = ?self.state, to = ?next, "parser transition");
        self.state = next;
    }
}

/// Position of the first CRLF in `haystack`.
fn find_crlf(haystack: &[u8]) -> Option<usize> {
    haystack.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Iterator that drains parts from a [`MultipartParser`].
///
/// Created by [`MultipartParser::drain_parts`].
pub struct DrainParts<'a> {
    parser: &'a mut MultipartParser,
}

impl<'a> Iterator for DrainParts<'a> {
    type Item = Part;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_part()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parser.parts_available();
        (len, Some(len))
    }
}

impl<'a> ExactSizeIterator for DrainParts<'a> {
    fn len(&self) -> usize {
        self.parser.parts_available()
    }
}
