use thiserror::Error;

/// Boxed upstream failure carried by [`Error::Upstream`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    // Caller-side precondition errors
    #[error("Missing Content-Type header")]
    MissingContentType,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Missing boundary parameter in Content-Type")]
    MissingBoundary,

    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    // Decode errors
    #[error("Malformed multipart body: expected opening boundary")]
    InvalidBoundaryPreamble,

    #[error("Part is missing a usable Content-Disposition header")]
    MissingContentDisposition,

    #[error("Multipart body ended before the terminal boundary")]
    UnterminatedBody,

    #[error("Part too large: {size} bytes (max: {max})")]
    PartTooLarge { size: usize, max: usize },

    #[error("Too many parts (max: {max})")]
    TooManyParts { max: usize },

    // Encoding errors
    #[error("Invalid part: {0}")]
    InvalidPart(String),

    // Transport errors
    #[error("Decode timed out after {0}ms")]
    Timeout(u64),

    #[error("Upstream error: {0}")]
    Upstream(#[source] BoxError),
}

impl Error {
    /// Wrap any transport failure as [`Error::Upstream`].
    pub fn upstream(cause: impl Into<BoxError>) -> Self {
        Error::Upstream(cause.into())
    }

    /// Whether the error is the client's fault (a malformed request body).
    ///
    /// Hosts map these to a 4xx response; everything else is propagated.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingContentType
                | Error::UnsupportedContentType(_)
                | Error::MissingBoundary
                | Error::InvalidBoundary(_)
                | Error::InvalidBoundaryPreamble
                | Error::MissingContentDisposition
                | Error::UnterminatedBody
                | Error::PartTooLarge { .. }
                | Error::TooManyParts { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Upstream(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
