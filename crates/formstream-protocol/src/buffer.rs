//! Growable decode buffer with read/scan/write cursors.
//!
//! The parser never holds the whole request body. Incoming chunks are
//! appended after the write position, the parser consumes bytes from the
//! read position, and the scan position remembers how far a boundary search
//! has already looked so that the same bytes are not checked twice.
//!
//! ```text
//! 0        read          scan               write        capacity
//! |consumed |  unconsumed  |   not yet scanned |   spare     |
//! ```
//!
//! Once a part has been extracted the buffer is compacted: the unconsumed
//! tail is shifted to offset 0 and all cursors are rebased. Resident memory
//! is therefore bounded by roughly one part plus the chunk in flight.
//!
//! Invariant, checked after every mutation: `read <= scan <= write <= capacity`.

use std::ops::Range;

use tracing::trace;

/// Contiguous byte region owned by one decode.
#[derive(Debug)]
pub struct DecodeBuffer {
    /// Received bytes; `data.len()` is the write position.
    data: Vec<u8>,

    /// Start of unconsumed data for the current parser state.
    read: usize,

    /// Furthest offset already checked by a delimiter search.
    scan: usize,

    /// Fixed growth step.
    growth_increment: usize,

    /// Number of times the buffer had to grow.
    growths: usize,
}

impl DecodeBuffer {
    /// Create a buffer with the given initial capacity and growth step.
    ///
    /// A zero growth step is treated as one byte.
    pub fn new(initial_capacity: usize, growth_increment: usize) -> Self {
        Self {
            data: Vec::with_capacity(initial_capacity),
            read: 0,
            scan: 0,
            growth_increment: growth_increment.max(1),
            growths: 0,
        }
    }

    /// Guarantee at least `n` bytes of spare capacity after the write position.
    ///
    /// Grows by whole multiples of the growth increment, and only when the
    /// current spare capacity is insufficient.
    ///
    /// # Example
    ///
    /// ```
    /// use formstream_protocol::DecodeBuffer;
    ///
    /// let mut buffer = DecodeBuffer::new(0, 16);
    /// buffer.ensure_writable(20);
    ///
    /// assert!(buffer.capacity() >= 32);
    /// assert_eq!(buffer.growth_count(), 1);
    /// ```
    pub fn ensure_writable(&mut self, n: usize) {
        let spare = self.spare_capacity();
        if spare >= n {
            return;
        }

        let steps = (n - spare).div_ceil(self.growth_increment);
        let grow_by = steps * self.growth_increment;
        self.data.reserve_exact(spare + grow_by);
        self.growths += 1;

        trace!(
            grow_by,
            capacity = self.data.capacity(),
            "decode buffer grown"
        );
        self.check_invariants();
    }

    /// Append a chunk after the write position, growing first if needed.
    pub fn write(&mut self, chunk: &[u8]) {
        self.ensure_writable(chunk.len());
        self.data.extend_from_slice(chunk);
        self.check_invariants();
    }

    /// Start of unconsumed data.
    pub fn read_position(&self) -> usize {
        self.read
    }

    /// Furthest offset already scanned.
    pub fn scan_position(&self) -> usize {
        self.scan
    }

    /// End of received data.
    pub fn write_position(&self) -> usize {
        self.data.len()
    }

    /// Total allocated capacity.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Capacity left after the write position.
    pub fn spare_capacity(&self) -> usize {
        self.data.capacity() - self.data.len()
    }

    /// Number of growth events so far.
    pub fn growth_count(&self) -> usize {
        self.growths
    }

    /// Bytes in `[read, write)`.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read..]
    }

    /// Bytes in `[scan, write)`.
    pub fn unscanned(&self) -> &[u8] {
        &self.data[self.scan..]
    }

    /// Number of bytes in `[read, write)`.
    pub fn unread_len(&self) -> usize {
        self.data.len() - self.read
    }

    /// All received bytes from offset 0 to the write position.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in an absolute range, clamped to the write position.
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        &self.data[start..end]
    }

    /// Move the read position forward by `n` bytes.
    ///
    /// The scan position is dragged along if it falls behind.
    pub fn consume(&mut self, n: usize) {
        self.read = (self.read + n).min(self.data.len());
        self.scan = self.scan.max(self.read);
        self.check_invariants();
    }

    /// Record the furthest scanned offset, clamped to `[read, write]`.
    pub fn set_scan_position(&mut self, position: usize) {
        self.scan = position.clamp(self.read, self.data.len());
        self.check_invariants();
    }

    /// Discard consumed bytes, shifting `[read, write)` to offset 0.
    ///
    /// Capacity is kept so the next part reuses the allocation.
    pub fn compact(&mut self) {
        if self.read == 0 {
            return;
        }

        let discarded = self.read;
        self.data.copy_within(self.read.., 0);
        self.data.truncate(self.data.len() - discarded);
        self.scan -= discarded;
        self.read = 0;

        trace!(discarded, retained = self.data.len(), "decode buffer compacted");
        self.check_invariants();
    }

    /// Drop all data and reset cursors.
    pub fn clear(&mut self) {
        self.data.clear();
        self.read = 0;
        self.scan = 0;
    }

    fn check_invariants(&self) {
        debug_assert!(self.read <= self.scan, "read {} > scan {}", self.read, self.scan);
        debug_assert!(
            self.scan <= self.data.len(),
            "scan {} > write {}",
            self.scan,
            self.data.len()
        );
        debug_assert!(self.data.len() <= self.data.capacity());
    }
}

impl Default for DecodeBuffer {
    fn default() -> Self {
        Self::new(
            formstream_core::constants::DEFAULT_INITIAL_CAPACITY,
            formstream_core::constants::DEFAULT_GROWTH_INCREMENT,
        )
    }
}
