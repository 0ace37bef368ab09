//! Transport bridge for the multipart decoder
//!
//! This crate connects push-based byte sources to the synchronous
//! [`MultipartParser`](formstream_protocol::MultipartParser). Every front-end
//! resolves a single result, the complete list of parts or one failure,
//! exactly once.
//!
//! # Components
//!
//! - **StreamAdapter**: callback surface (`on_chunk`, `on_complete`, `on_error`)
//! - **DecodeHandle**: one-shot future carrying the final result
//! - **spawn_decoder**: tokio task fed through an unbounded channel of [`ChunkEvent`]s
//! - **decode_stream** / **decode_reader**: drive a `Stream` or `AsyncRead` to completion
//!
//! # Example
//!
//! ```no_run
//! use formstream_core::{Boundary, DecoderConfig};
//! use formstream_transport::decode_reader;
//!
//! # async fn example(body: impl tokio::io::AsyncRead) -> formstream_core::Result<()> {
//! let boundary = Boundary::new("----WebKitFormBoundary7MA4YWxkTrZu0gW")?;
//! let parts = decode_reader(boundary, &DecoderConfig::default(), body).await?;
//!
//! for part in &parts {
//!     println!("{}: {} bytes", part.name(), part.len());
//! }
//! # Ok(())
//! # }
//! ```

mod adapter;
mod event;
mod handle;
mod task;

pub use adapter::{Flow, StreamAdapter};
pub use event::ChunkEvent;
pub use handle::DecodeHandle;
pub use task::{ChunkSender, decode_reader, decode_stream, spawn_decoder};
