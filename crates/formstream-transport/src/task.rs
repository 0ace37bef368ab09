//! Async front-ends driving a [`StreamAdapter`].
//!
//! Three ways to get bytes into the decoder:
//!
//! - [`spawn_decoder`]: a background task drains an unbounded channel of
//!   [`ChunkEvent`]s; the caller pushes through a [`ChunkSender`]
//! - [`decode_stream`]: pull every item of a `futures::Stream` of chunks
//! - [`decode_reader`]: read an `AsyncRead` to the terminal boundary
//!
//! # Architecture
//!
//! ```text
//! producer ──> ChunkSender ──(mpsc)──> decoder task ──> StreamAdapter ──> MultipartParser
//!                                                            │
//!                                                            └──(oneshot)──> DecodeHandle
//! ```

use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use crate::{ChunkEvent, DecodeHandle, Flow, StreamAdapter};
use formstream_core::{BoxError, Boundary, DecoderConfig, Part, Result};

/// Producer side of a spawned decoder
///
/// Every method returns `false` once the decoder task has stopped listening,
/// which happens as soon as the result settles.
#[derive(Debug)]
pub struct ChunkSender {
    tx: mpsc::UnboundedSender<ChunkEvent>,
}

impl ChunkSender {
    /// Push the next chunk of the body
    pub fn send_chunk(&self, chunk: impl Into<Bytes>) -> bool {
        self.send(ChunkEvent::Chunk(chunk.into()))
    }

    /// Signal the end of the body
    pub fn complete(self) -> bool {
        self.send(ChunkEvent::Complete)
    }

    /// Signal a producer failure
    pub fn error(self, cause: impl Into<BoxError>) -> bool {
        self.send(ChunkEvent::Error(cause.into()))
    }

    /// Whether the decoder task has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, event: ChunkEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Spawn a decoder task fed through an unbounded channel
///
/// The channel never applies backpressure. Dropping the [`ChunkSender`]
/// without calling `complete` or `error` settles the handle with
/// `Error::UnterminatedBody`.
///
/// Must be called from within a tokio runtime.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use formstream_core::{Boundary, DecoderConfig};
/// use formstream_transport::spawn_decoder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (sender, handle) = spawn_decoder(Boundary::new("B").unwrap(), &DecoderConfig::default());
///
/// sender.send_chunk(Bytes::from_static(b"--B\r\nContent-Disposition: form-data; name=\"q\"\r\n\r\n"));
/// sender.send_chunk(Bytes::from_static(b"rust\r\n--B--\r\n"));
/// sender.complete();
///
/// let parts = handle.await.unwrap();
/// assert_eq!(parts[0].text(), Some("rust"));
/// # }
/// ```
pub fn spawn_decoder(boundary: Boundary, config: &DecoderConfig) -> (ChunkSender, DecodeHandle) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (mut adapter, handle) = StreamAdapter::with_config(boundary, config);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if adapter.dispatch(event) == Flow::Stop {
                break;
            }
        }

        if !adapter.is_settled() {
            debug!("Chunk sender dropped before the body ended");
        }
        trace!(chunks = adapter.chunks_received(), "Decoder task finished");
    });

    (ChunkSender { tx }, handle)
}

/// Decode a body delivered as a stream of chunks
///
/// Items are pulled until the result settles. A stream that ends before the
/// terminal boundary yields `Error::UnterminatedBody`; an `Err` item yields
/// `Error::Upstream`.
pub async fn decode_stream<S, B, E>(
    boundary: Boundary,
    config: &DecoderConfig,
    stream: S,
) -> Result<Vec<Part>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    let (mut adapter, handle) = StreamAdapter::with_config(boundary, config);
    let mut stream = pin!(stream);

    while !adapter.is_settled() {
        match stream.next().await {
            Some(Ok(chunk)) => {
                adapter.on_chunk(chunk.as_ref());
            }
            Some(Err(e)) => adapter.on_error(e),
            None => adapter.on_complete(),
        }
    }

    handle.await
}

/// Decode a body read from any `AsyncRead`
///
/// I/O errors surface as `Error::Upstream`. Reading stops at the terminal
/// boundary; any epilogue is left unread.
pub async fn decode_reader<R>(
    boundary: Boundary,
    config: &DecoderConfig,
    reader: R,
) -> Result<Vec<Part>>
where
    R: AsyncRead,
{
    decode_stream(boundary, config, ReaderStream::new(reader)).await
}
