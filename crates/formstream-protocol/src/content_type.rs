//! Boundary extraction from a request `Content-Type` header.
//!
//! This runs on the caller side, before decoding starts: the decoder only
//! ever receives an already validated [`Boundary`].
//!
//! ```
//! use formstream_protocol::boundary_from_content_type;
//!
//! let boundary = boundary_from_content_type(Some(r#"multipart/form-data; boundary="XyZ""#)).unwrap();
//! assert_eq!(boundary.as_str(), "XyZ");
//! ```

use formstream_core::{Boundary, Error, Result, constants::MULTIPART_PREFIX};

use crate::headers::parameters;

/// Validate a `Content-Type` value and return its boundary.
///
/// # Errors
///
/// - `Error::MissingContentType` if the header is absent or blank
/// - `Error::UnsupportedContentType` if the media type is not `multipart/*`
/// - `Error::MissingBoundary` if there is no `boundary` parameter
/// - `Error::InvalidBoundary` if the boundary violates RFC 2046
pub fn boundary_from_content_type(content_type: Option<&str>) -> Result<Boundary> {
    let value = content_type
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingContentType)?;

    let media_type = value.split(';').next().unwrap_or_default().trim();
    let is_multipart = media_type
        .get(..MULTIPART_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(MULTIPART_PREFIX));
    if !is_multipart {
        return Err(Error::UnsupportedContentType(media_type.to_string()));
    }

    let boundary = parameters(value)
        .into_iter()
        .find(|(key, _)| key == "boundary")
        .map(|(_, v)| v)
        .ok_or(Error::MissingBoundary)?;

    Boundary::new(boundary)
}

/// Build the request `Content-Type` value for a form body with `boundary`.
///
/// The boundary is quoted when it contains characters outside the HTTP
/// `token` set.
///
/// ```
/// use formstream_core::Boundary;
/// use formstream_protocol::content_type_header;
///
/// let plain = Boundary::new("abc123").unwrap();
/// assert_eq!(content_type_header(&plain), "multipart/form-data; boundary=abc123");
///
/// let spaced = Boundary::new("a b").unwrap();
/// assert_eq!(content_type_header(&spaced), r#"multipart/form-data; boundary="a b""#);
/// ```
pub fn content_type_header(boundary: &Boundary) -> String {
    if boundary.as_str().chars().all(is_token_char) {
        format!("multipart/form-data; boundary={boundary}")
    } else {
        format!("multipart/form-data; boundary=\"{boundary}\"")
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
