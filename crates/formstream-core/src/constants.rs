//! Wire-level constants for `multipart/form-data` decoding.
//!
//! A multipart body (RFC 2046, section 5.1) is a sequence of parts separated
//! by delimiter lines built from the boundary carried in the `Content-Type`
//! header:
//!
//! ```text
//! --boundary\r\n
//! Content-Disposition: form-data; name="field"\r\n
//! \r\n
//! <raw bytes>\r\n
//! --boundary--
//! ```
//!
//! The constants below name each fixed piece of that layout, and the
//! `*_LEN` helpers compute the exact byte counts the parser must have
//! buffered before it may attempt a state transition.

// ============================================================================
// Line and Delimiter Markers
// ============================================================================

/// Line terminator. Bare `\n` is never accepted.
pub const CRLF: &[u8] = b"\r\n";

/// Prefix placed before the boundary in every delimiter line.
pub const DASH_DASH: &[u8] = b"--";

/// Suffix after the boundary that marks the terminal delimiter.
///
/// ```text
/// --boundary--
///           ^^
/// ```
pub const CLOSE_SUFFIX: &[u8] = b"--";

// ============================================================================
// Header Names
// ============================================================================

/// Header carrying the field name and optional filename (matched case-insensitively).
pub const CONTENT_DISPOSITION: &str = "content-disposition:";

/// Per-part media type header (matched case-insensitively).
pub const CONTENT_TYPE: &str = "content-type:";

/// Media type prefix accepted by the boundary extraction helper.
pub const MULTIPART_PREFIX: &str = "multipart/";

// ============================================================================
// Boundary Limits (RFC 2046)
// ============================================================================

/// Minimum boundary length in bytes.
pub const MIN_BOUNDARY_LENGTH: usize = 1;

/// Maximum boundary length in bytes.
pub const MAX_BOUNDARY_LENGTH: usize = 70;

// ============================================================================
// Buffer Sizing
// ============================================================================

/// Fixed step by which the decode buffer grows when an incoming chunk
/// does not fit in the remaining capacity.
pub const DEFAULT_GROWTH_INCREMENT: usize = 4 * 1024 * 1024; // 4 MiB

/// First allocation made for the decode buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024; // 8 KiB

// ============================================================================
// Exact Transition Lengths
// ============================================================================

/// Bytes needed to validate the opening line `--boundary\r\n`.
///
/// # Examples
///
/// ```
/// use formstream_core::constants::opening_len;
///
/// assert_eq!(opening_len(1), 5); // "--B\r\n"
/// ```
#[must_use]
pub const fn opening_len(boundary_len: usize) -> usize {
    boundary_len + 4
}

/// Bytes of the delimiter `\r\n--boundary` that ends a part body.
#[must_use]
pub const fn delimiter_len(boundary_len: usize) -> usize {
    boundary_len + 4
}

/// Bytes needed to classify a delimiter: `\r\n--boundary` plus the two
/// bytes deciding between `--` (terminal) and `\r\n` (another part).
///
/// # Examples
///
/// ```
/// use formstream_core::constants::classified_delimiter_len;
///
/// assert_eq!(classified_delimiter_len(1), 7); // "\r\n--B--"
/// ```
#[must_use]
pub const fn classified_delimiter_len(boundary_len: usize) -> usize {
    delimiter_len(boundary_len) + 2
}
