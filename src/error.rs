use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;
use http::StatusCode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while decoding a multipart stream.
///
/// Every variant is unrecoverable for the decode call that produced it: the
/// stream has already been partially consumed and cannot be rewound, so the
/// caller receives the error and no [`Form`](crate::Form).
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The `Content-Type` header is absent, is not `multipart/form-data`, or
    /// carries no `boundary=` token.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    MissingBoundary,

    /// A field's header block has an unparsable line.
    #[display(fmt = "malformed field header block: {}", _0)]
    MalformedHeader(BoxError),

    /// A single field's body exceeded the per-field size limit before the
    /// next boundary was found.
    #[display(
        fmt = "field '{}' exceeded the size limit: {} bytes",
        "field_name.as_deref().unwrap_or(\"<unknown>\")",
        limit
    )]
    FieldSizeExceeded { limit: u64, field_name: Option<String> },

    /// The fields consumed so far exceeded the cumulative size limit.
    #[display(fmt = "form data exceeded the total size limit: {} bytes", limit)]
    TotalSizeExceeded { limit: u64 },

    /// Reading from the underlying stream failed.
    #[display(fmt = "stream read failed: {}", _0)]
    StreamReadFailed(BoxError),
}

impl Error {
    /// The HTTP response status a server would typically map this error to:
    /// size violations become `413 Payload Too Large`, unusable input becomes
    /// `400 Bad Request`, transport failures a generic `500`.
    pub fn status_hint(&self) -> StatusCode {
        match self {
            Error::FieldSizeExceeded { .. } | Error::TotalSizeExceeded { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Error::MissingBoundary | Error::MalformedHeader(_) => StatusCode::BAD_REQUEST,
            Error::StreamReadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
