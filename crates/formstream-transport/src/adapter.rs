//! Callback bridge between a push-based byte source and the parser.
//!
//! The [`StreamAdapter`] owns one [`MultipartParser`] and the sending half of
//! the result channel. Chunks are fed to the parser as they arrive; the
//! result settles on the first of:
//!
//! 1. the terminal boundary being parsed (success),
//! 2. the parser rejecting the body,
//! 3. the producer signalling completion or an error,
//! 4. the adapter being dropped.
//!
//! # Demand
//!
//! The adapter never asks for chunks. It accepts whatever the producer
//! pushes, one call at a time, so any pacing comes from the producer. After
//! settlement every call is a no-op and [`Flow::Stop`] tells the producer
//! it may cancel.
//!
//! # Example
//!
//! ```
//! use formstream_core::Boundary;
//! use formstream_transport::{Flow, StreamAdapter};
//!
//! let (mut adapter, mut handle) = StreamAdapter::new(Boundary::new("B").unwrap());
//!
//! assert_eq!(adapter.on_chunk(b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n"), Flow::Continue);
//! assert_eq!(adapter.on_chunk(b"\r\nhello\r\n--B--\r\n"), Flow::Stop);
//!
//! let parts = handle.try_result().unwrap().unwrap();
//! assert_eq!(parts[0].name(), "a");
//! ```

use tracing::{debug, info, trace, warn};

use crate::ChunkEvent;
use crate::handle::{DecodeHandle, ResultSender};
use formstream_core::{BoxError, Boundary, DecoderConfig, Error, Part, Result};
use formstream_protocol::{MultipartParser, Status};

/// What the producer should do after delivering an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep sending chunks
    Continue,

    /// The result is settled; further events are ignored
    Stop,
}

/// Push-based decoder front-end
///
/// Created together with the [`DecodeHandle`] it settles. Callbacks take
/// `&mut self`, so calls arrive one after another, as from a single producer.
#[derive(Debug)]
pub struct StreamAdapter {
    /// Parser, present until the result settles
    parser: Option<MultipartParser>,

    /// Result channel, taken on settlement
    settle: Option<ResultSender>,

    chunks_received: u64,
    bytes_received: u64,
}

impl StreamAdapter {
    /// Create an adapter with the default decoder configuration
    pub fn new(boundary: Boundary) -> (Self, DecodeHandle) {
        Self::with_config(boundary, &DecoderConfig::default())
    }

    /// Create an adapter with explicit limits and buffer sizing
    pub fn with_config(boundary: Boundary, config: &DecoderConfig) -> (Self, DecodeHandle) {
        debug!(boundary = %boundary, "Creating stream adapter");

        let (tx, handle) = DecodeHandle::channel();
        let adapter = Self {
            parser: Some(MultipartParser::with_config(boundary, config)),
            settle: Some(tx),
            chunks_received: 0,
            bytes_received: 0,
        };
        (adapter, handle)
    }

    /// Feed the next chunk of the body
    ///
    /// Settles the result when the chunk completes the body or the parser
    /// rejects it.
    pub fn on_chunk(&mut self, chunk: &[u8]) -> Flow {
        let Some(parser) = self.parser.as_mut() else {
            trace!(len = chunk.len(), "Ignoring chunk after settlement");
            return Flow::Stop;
        };

        self.chunks_received += 1;
        self.bytes_received += chunk.len() as u64;
        debug!(
            len = chunk.len(),
            chunk = self.chunks_received,
            "Feeding chunk to parser"
        );

        match parser.feed(chunk) {
            Ok(Status::Pending) => Flow::Continue,
            Ok(Status::Complete) => {
                if let Some(parser) = self.parser.take() {
                    self.settle(parser.finish());
                }
                Flow::Stop
            }
            Err(e) => {
                self.parser = None;
                self.settle(Err(e));
                Flow::Stop
            }
        }
    }

    /// Signal that the producer has no more bytes
    ///
    /// If the terminal boundary has not been seen this settles with
    /// `Error::UnterminatedBody`.
    pub fn on_complete(&mut self) {
        match self.parser.take() {
            Some(parser) => self.settle(parser.finish()),
            None => trace!("Ignoring completion after settlement"),
        }
    }

    /// Signal that the producer failed
    pub fn on_error(&mut self, cause: impl Into<BoxError>) {
        let cause = cause.into();
        if self.parser.take().is_some() {
            self.settle(Err(Error::upstream(cause)));
        } else {
            trace!(error = %cause, "Ignoring upstream error after settlement");
        }
    }

    /// Route one [`ChunkEvent`] to the matching callback
    pub fn dispatch(&mut self, event: ChunkEvent) -> Flow {
        match event {
            ChunkEvent::Chunk(chunk) => self.on_chunk(&chunk),
            ChunkEvent::Complete => {
                self.on_complete();
                Flow::Stop
            }
            ChunkEvent::Error(cause) => {
                self.on_error(cause);
                Flow::Stop
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settle.is_none()
    }

    pub fn chunks_received(&self) -> u64 {
        self.chunks_received
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    fn settle(&mut self, result: Result<Vec<Part>>) {
        let Some(tx) = self.settle.take() else {
            trace!("Result already settled");
            return;
        };

        match &result {
            Ok(parts) => info!(
                parts = parts.len(),
                bytes = self.bytes_received,
                chunks = self.chunks_received,
                "Multipart body decoded"
            ),
            Err(e) => warn!(
                error = %e,
                bytes = self.bytes_received,
                "Multipart decode failed"
            ),
        }

        if tx.send(result).is_err() {
            debug!("Decode handle dropped before the result was delivered");
        }
    }
}

impl Drop for StreamAdapter {
    fn drop(&mut self) {
        if !self.is_settled() {
            self.parser = None;
            self.settle(Err(Error::UnterminatedBody));
        }
    }
}
