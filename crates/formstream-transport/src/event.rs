use bytes::Bytes;
use formstream_core::BoxError;

/// One signal from a byte-chunk producer
///
/// A well-behaved producer sends any number of `Chunk`s followed by exactly
/// one `Complete` or `Error`.
#[derive(Debug)]
pub enum ChunkEvent {
    /// Next slice of the body
    Chunk(Bytes),

    /// The producer has no more bytes
    Complete,

    /// The producer failed
    Error(BoxError),
}

impl ChunkEvent {
    /// Whether this event ends the producer's sequence
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChunkEvent::Chunk(_))
    }
}

impl From<Bytes> for ChunkEvent {
    fn from(chunk: Bytes) -> Self {
        ChunkEvent::Chunk(chunk)
    }
}
