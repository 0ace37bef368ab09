use bytes::{BufMut, Bytes, BytesMut};

use crate::content_type::content_type_header;
use formstream_core::{
    Boundary, Error, Part, Result,
    constants::{CLOSE_SUFFIX, CRLF, DASH_DASH},
};

/// Builder for encoding parts into a `multipart/form-data` body
///
/// Produces exactly the wire format the parser decodes, so a built body
/// always round-trips.
///
/// # Example
/// ```
/// use formstream_core::{Boundary, Part};
/// use formstream_protocol::MultipartBuilder;
///
/// let body = MultipartBuilder::new(Boundary::new("B").unwrap())
///     .text("a", "hello").unwrap()
///     .part(Part::new("f", "data").with_filename("x.txt").with_content_type("text/plain")).unwrap()
///     .build();
///
/// assert!(body.starts_with(b"--B\r\n"));
/// assert!(body.ends_with(b"--B--\r\n"));
/// ```
pub struct MultipartBuilder {
    boundary: Boundary,
    parts: Vec<Part>,
}

impl MultipartBuilder {
    /// Create a builder for the given boundary
    pub fn new(boundary: Boundary) -> Self {
        MultipartBuilder {
            boundary,
            parts: Vec::new(),
        }
    }

    /// Create a builder with a freshly generated boundary
    pub fn with_random_boundary() -> Self {
        Self::new(Boundary::generate())
    }

    /// Add a part
    ///
    /// # Errors
    /// Returns `Error::InvalidPart` if the name or filename contains `"`, CR
    /// or LF, the content type contains CR or LF, or the payload contains
    /// the body delimiter.
    pub fn part(mut self, part: Part) -> Result<Self> {
        validate_part(&self.boundary, &part)?;
        self.parts.push(part);
        Ok(self)
    }

    /// Add several parts, in order
    ///
    /// # Errors
    /// Returns error if any part fails validation.
    pub fn parts(mut self, parts: impl IntoIterator<Item = Part>) -> Result<Self> {
        for part in parts {
            self = self.part(part)?;
        }
        Ok(self)
    }

    /// Add a plain text field
    ///
    /// # Errors
    /// Returns error if the name or value fails validation.
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.part(Part::new(name, Bytes::from(value.into())))
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// `Content-Type` header value to send alongside the body
    pub fn content_type(&self) -> String {
        content_type_header(&self.boundary)
    }

    /// Encode all parts and the terminal delimiter
    pub fn build(self) -> Bytes {
        encode(&self.boundary, &self.parts)
    }
}

/// Encode parts into a complete body
///
/// # Errors
/// Returns error if any part fails validation.
pub fn format_body(boundary: &Boundary, parts: &[Part]) -> Result<Bytes> {
    for part in parts {
        validate_part(boundary, part)?;
    }
    Ok(encode(boundary, parts))
}

fn encode(boundary: &Boundary, parts: &[Part]) -> Bytes {
    let payload_len: usize = parts.iter().map(Part::len).sum();
    let mut buf = BytesMut::with_capacity(payload_len + parts.len() * 128 + boundary.len() + 8);

    for part in parts {
        buf.put_slice(DASH_DASH);
        buf.put_slice(boundary.as_bytes());
        buf.put_slice(CRLF);

        buf.put_slice(b"Content-Disposition: form-data; name=\"");
        buf.put_slice(part.name().as_bytes());
        buf.put_u8(b'"');
        if let Some(filename) = part.filename() {
            buf.put_slice(b"; filename=\"");
            buf.put_slice(filename.as_bytes());
            buf.put_u8(b'"');
        }
        buf.put_slice(CRLF);

        if let Some(content_type) = part.content_type() {
            buf.put_slice(b"Content-Type: ");
            buf.put_slice(content_type.as_bytes());
            buf.put_slice(CRLF);
        }

        buf.put_slice(CRLF);
        buf.put_slice(part.payload());
        buf.put_slice(CRLF);
    }

    buf.put_slice(DASH_DASH);
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(CLOSE_SUFFIX);
    buf.put_slice(CRLF);

    buf.freeze()
}

fn validate_part(boundary: &Boundary, part: &Part) -> Result<()> {
    let bad_param = |s: &str| s.contains(['"', '\r', '\n']);

    if bad_param(part.name()) {
        return Err(Error::InvalidPart(format!(
            "Part name {:?} contains a quote or line break",
            part.name()
        )));
    }
    if let Some(filename) = part.filename().filter(|f| bad_param(f)) {
        return Err(Error::InvalidPart(format!(
            "Filename {filename:?} contains a quote or line break"
        )));
    }
    if let Some(content_type) = part.content_type().filter(|c| c.contains(['\r', '\n'])) {
        return Err(Error::InvalidPart(format!(
            "Content type {content_type:?} contains a line break"
        )));
    }

    let mut delimiter = Vec::with_capacity(boundary.len() + 4);
    delimiter.extend_from_slice(CRLF);
    delimiter.extend_from_slice(DASH_DASH);
    delimiter.extend_from_slice(boundary.as_bytes());

    if part
        .payload()
        .windows(delimiter.len())
        .any(|w| w == delimiter.as_slice())
    {
        return Err(Error::InvalidPart(format!(
            "Payload of {:?} contains the boundary delimiter",
            part.name()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MultipartParser;

    fn boundary() -> Boundary {
        Boundary::new("B").unwrap()
    }

    #[test]
    fn test_build_single_field() {
        let body = MultipartBuilder::new(boundary())
            .text("a", "hello")
            .unwrap()
            .build();

        assert_eq!(
            body.as_ref(),
            b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--B--\r\n"
        );
    }

    #[test]
    fn test_build_file_part() {
        let body = MultipartBuilder::new(boundary())
            .part(
                Part::new("f", "x")
                    .with_filename("x.txt")
                    .with_content_type("text/plain"),
            )
            .unwrap()
            .build();

        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains(
            "name=\"f\"; filename=\"x.txt\"\r\nContent-Type: text/plain\r\n\r\nx\r\n"
        ));
    }

    #[test]
    fn test_build_no_parts() {
        let body = MultipartBuilder::new(boundary()).build();
        assert_eq!(body.as_ref(), b"--B--\r\n");
    }

    #[test]
    fn test_rejects_quote_in_name() {
        let result = MultipartBuilder::new(boundary()).text("a\"b", "v");
        assert!(matches!(result, Err(Error::InvalidPart(_))));
    }

    #[test]
    fn test_rejects_line_break_in_filename() {
        let part = Part::new("f", "v").with_filename("a\r\nb");
        assert!(MultipartBuilder::new(boundary()).part(part).is_err());
    }

    #[test]
    fn test_rejects_line_break_in_content_type() {
        let part = Part::new("f", "v").with_content_type("text/plain\r\nX-Evil: 1");
        assert!(MultipartBuilder::new(boundary()).part(part).is_err());
    }

    #[test]
    fn test_rejects_delimiter_in_payload() {
        let result = MultipartBuilder::new(boundary()).text("a", "x\r\n--B\r\ny");
        assert!(matches!(result, Err(Error::InvalidPart(_))));
    }

    #[test]
    fn test_rejects_payload_ending_in_delimiter() {
        let result = MultipartBuilder::new(boundary()).text("a", "tail\r\n--B");
        assert!(result.is_err());
    }

    #[test]
    fn test_random_boundary_content_type() {
        let builder = MultipartBuilder::with_random_boundary();
        let header = builder.content_type();
        assert!(header.starts_with("multipart/form-data; boundary="));
        assert!(header.ends_with(builder.boundary().as_str()));
    }

    #[test]
    fn test_backslashes_roundtrip_literally() {
        let parts = vec![
            Part::new("f", "x").with_filename(r"C:\temp\"),
            Part::new(r"a\b", "y"),
        ];
        let body = format_body(&boundary(), &parts).unwrap();

        let mut parser = MultipartParser::new(boundary());
        parser.feed(&body).unwrap();
        let decoded = parser.finish().unwrap();
        assert_eq!(decoded[0].filename(), Some(r"C:\temp\"));
        assert_eq!(decoded[1].name(), r"a\b");
    }

    #[test]
    fn test_format_body_roundtrip() {
        let parts = vec![
            Part::new("a", "1"),
            Part::new("b", vec![0u8, 1, 2]).with_filename("b.bin"),
            Part::new("c", "").with_content_type("text/plain"),
        ];
        let body = format_body(&boundary(), &parts).unwrap();

        let mut parser = MultipartParser::new(boundary());
        parser.feed(&body).unwrap();
        assert_eq!(parser.finish().unwrap(), parts);
    }
}
