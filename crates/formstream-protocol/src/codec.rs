//! Tokio codec yielding multipart parts from a byte stream.
//!
//! `FormDataCodec` wraps a [`MultipartParser`] behind the tokio-util
//! [`Decoder`] trait so that a `FramedRead` over any `AsyncRead` produces
//! a stream of [`Part`]s, each emitted as soon as its closing delimiter
//! has been read.
//!
//! # Architecture
//!
//! ```text
//! AsyncRead -> FramedRead -> FormDataCodec -> MultipartParser -> Part
//! ```
//!
//! # Usage with Tokio FramedRead
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use tokio_util::codec::FramedRead;
//! use formstream_core::Boundary;
//! use formstream_protocol::FormDataCodec;
//!
//! # async fn example(body: impl tokio::io::AsyncRead + Unpin) -> formstream_core::Result<()> {
//! let boundary = Boundary::new("B")?;
//! let mut parts = FramedRead::new(body, FormDataCodec::new(boundary));
//!
//! while let Some(part) = parts.next().await {
//!     let part = part?;
//!     println!("{} ({} bytes)", part.name(), part.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # End of Stream
//!
//! If the reader reaches EOF before the terminal boundary, `decode_eof`
//! returns `Error::UnterminatedBody` instead of silently ending the stream.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::MultipartParser;
use formstream_core::{Boundary, DecoderConfig, Error, Part, Result};

/// Tokio decoder for `multipart/form-data` bodies.
#[derive(Debug)]
pub struct FormDataCodec {
    parser: MultipartParser,
}

impl FormDataCodec {
    /// Create a codec with the default decoder configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use formstream_core::Boundary;
    /// use formstream_protocol::FormDataCodec;
    ///
    /// let codec = FormDataCodec::new(Boundary::new("B").unwrap());
    /// assert_eq!(codec.boundary().as_str(), "B");
    /// ```
    pub fn new(boundary: Boundary) -> Self {
        Self {
            parser: MultipartParser::new(boundary),
        }
    }

    /// Create a codec with explicit limits and buffer sizing.
    pub fn with_config(boundary: Boundary, config: &DecoderConfig) -> Self {
        Self {
            parser: MultipartParser::with_config(boundary, config),
        }
    }

    pub fn boundary(&self) -> &Boundary {
        self.parser.boundary()
    }

    /// Whether the terminal boundary has been decoded.
    pub fn is_done(&self) -> bool {
        self.parser.is_done()
    }

    /// Access the underlying parser.
    pub fn parser(&self) -> &MultipartParser {
        &self.parser
    }
}

impl Decoder for FormDataCodec {
    type Item = Part;
    type Error = Error;

    /// Decode the next completed part.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Part))` - A part's closing delimiter has been read
    /// - `Ok(None)` - Need more data (or the body is complete)
    /// - `Err(Error)` - Malformed body or a configured limit was exceeded
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use formstream_core::Boundary;
    /// use formstream_protocol::FormDataCodec;
    ///
    /// let mut codec = FormDataCodec::new(Boundary::new("B").unwrap());
    /// let mut buffer = BytesMut::from(
    ///     &b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--"[..],
    /// );
    ///
    /// let part = codec.decode(&mut buffer).unwrap().unwrap();
    /// assert_eq!(part.text(), Some("hi"));
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            // The parser copies into its own buffer, so src can be released
            self.parser.feed(src)?;
            src.clear();
        }

        Ok(self.parser.next_part())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(part) = self.decode(src)? {
            return Ok(Some(part));
        }

        if self.parser.is_done() {
            Ok(None)
        } else {
            Err(Error::UnterminatedBody)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PARTS: &[u8] = b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
        --B\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\n2\r\n--B--\r\n";

    fn codec() -> FormDataCodec {
        FormDataCodec::new(Boundary::new("B").unwrap())
    }

    #[test]
    fn test_decode_multiple_parts_in_buffer() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(TWO_PARTS);

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.name(), "a");
        assert!(buffer.is_empty());

        // Second part already parsed, delivered without new input
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.name(), "b");

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert!(codec.is_done());
    }

    #[test]
    fn test_decode_partial_input() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&TWO_PARTS[..20]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());
        assert!(!codec.is_done());
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = codec();
        let mut buffer = BytesMut::new();
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_complete() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(TWO_PARTS);

        assert!(codec.decode_eof(&mut buffer).unwrap().is_some());
        assert!(codec.decode_eof(&mut buffer).unwrap().is_some());
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_unterminated() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&TWO_PARTS[..TWO_PARTS.len() - 10]);

        // First part is still delivered before the error
        assert_eq!(codec.decode_eof(&mut buffer).unwrap().unwrap().name(), "a");
        assert!(matches!(
            codec.decode_eof(&mut buffer),
            Err(Error::UnterminatedBody)
        ));
    }

    #[test]
    fn test_decode_malformed() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"garbage!"[..]);
        assert!(matches!(
            codec.decode(&mut buffer),
            Err(Error::InvalidBoundaryPreamble)
        ));
    }

    #[test]
    fn test_with_config_limits() {
        let config = DecoderConfig::new().max_parts(1);
        let mut codec = FormDataCodec::with_config(Boundary::new("B").unwrap(), &config);
        let mut buffer = BytesMut::from(TWO_PARTS);

        assert!(matches!(
            codec.decode(&mut buffer),
            Err(Error::TooManyParts { max: 1 })
        ));
    }
}
