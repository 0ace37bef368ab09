use crate::{
    Result,
    constants::{MAX_BOUNDARY_LENGTH, MIN_BOUNDARY_LENGTH},
    error::Error,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Multipart boundary (1-70 characters from the RFC 2046 `bchars` set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Boundary(String);

impl Boundary {
    /// Create a boundary with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidBoundary` if:
    /// - The length is not between 1-70 bytes
    /// - It contains characters outside the RFC 2046 `bchars` set
    /// - It ends with a space
    pub fn new(boundary: impl Into<String>) -> Result<Self> {
        let boundary = boundary.into();

        let len = boundary.len();
        if !(MIN_BOUNDARY_LENGTH..=MAX_BOUNDARY_LENGTH).contains(&len) {
            return Err(Error::InvalidBoundary(format!(
                "Boundary must be {MIN_BOUNDARY_LENGTH}-{MAX_BOUNDARY_LENGTH} chars, got {len}"
            )));
        }

        if let Some(c) = boundary.chars().find(|&c| !is_bchar(c)) {
            return Err(Error::InvalidBoundary(format!(
                "Boundary contains invalid character {c:?}"
            )));
        }

        if boundary.ends_with(' ') {
            return Err(Error::InvalidBoundary(
                "Boundary must not end with a space".to_string(),
            ));
        }

        Ok(Boundary(boundary))
    }

    /// Generate a random boundary suitable for encoding a body.
    #[must_use]
    pub fn generate() -> Self {
        Boundary(format!("----formstream{}", Uuid::new_v4().simple()))
    }

    /// Get the boundary as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the boundary bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length of the boundary in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_bchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Boundary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Boundary::new(s)
    }
}

impl TryFrom<String> for Boundary {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Boundary::new(value)
    }
}

impl From<Boundary> for String {
    fn from(boundary: Boundary) -> Self {
        boundary.0
    }
}

/// One decoded multipart section: a form field or an uploaded file.
///
/// Parts are only ever produced once their full payload is known, and the
/// payload is an independently owned copy that outlives the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    payload: Bytes,
}

impl Part {
    /// Create a plain field part.
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Part {
            name: name.into(),
            filename: None,
            content_type: None,
            payload: payload.into(),
        }
    }

    /// Attach a filename, turning the part into a file upload.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach a media type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Field name from `Content-Disposition`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename from `Content-Disposition`, if present.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Value of the part's `Content-Type` header, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consume the part and return its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Payload as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Whether the part carries a filename.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
