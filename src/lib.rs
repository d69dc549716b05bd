//! A bounded-memory streaming decoder for `multipart/form-data` request
//! bodies.
//!
//! The decoder parses a request body into named form fields (text values and
//! file attachments) without ever buffering the whole body: at any instant it
//! holds at most one field's look-ahead window plus the completed fields, and
//! it enforces a per-field cap and a cumulative budget as bytes are consumed,
//! so a malicious or oversized upload fails deterministically instead of
//! exhausting memory.
//!
//! # Examples
//!
//! ```
//! use formbound::{FormOptions, FormReader};
//! use bytes::Bytes;
//! use std::convert::Infallible;
//! use futures_util::stream::once;
//!
//! # async fn run() {
//! let content_type = "multipart/form-data; boundary=X-BOUNDARY";
//! let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhi\r\n--X-BOUNDARY--\r\n";
//!
//! let boundary = formbound::parse_boundary(content_type).unwrap();
//! let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
//! let options = FormOptions::new().multiple(true);
//!
//! let form = FormReader::with_options(stream, boundary, options)
//!     .read_form()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(form.get("title").unwrap().first().text(), Some("hi"));
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(run());
//! ```

pub use error::Error;
pub use field::{FieldContent, FieldInfo};
pub use form::{Form, FormValue};
pub use multipart::FormReader;
pub use options::FormOptions;
pub use save::{save_files, SavedFile};

mod boundary;
mod buffer;
mod constants;
mod content_disposition;
mod error;
mod field;
mod form;
mod headers;
mod multipart;
mod options;
mod save;

/// A `Result` type often returned from methods that can have `formbound`
/// errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header value to extract the boundary token.
///
/// The header must name `multipart/form-data` and carry a `boundary=`
/// parameter; everything after the literal `boundary=` token is the boundary,
/// taken verbatim with no unescaping.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let content_type = content_type.as_ref();

    let m = content_type
        .parse::<mime::Mime>()
        .map_err(|_| crate::Error::MissingBoundary)?;

    if !(m.type_() == mime::MULTIPART_FORM_DATA.type_()
        && m.subtype() == mime::MULTIPART_FORM_DATA.subtype())
    {
        return Err(crate::Error::MissingBoundary);
    }

    const BOUNDARY_TOKEN: &str = "boundary=";
    match content_type.find(BOUNDARY_TOKEN) {
        Some(idx) => Ok(content_type[idx + BOUNDARY_TOKEN.len()..].to_owned()),
        None => Err(crate::Error::MissingBoundary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        let content_type = "multipart/form-data; boundary=ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("ABCDEFG".to_owned()));

        let content_type = "multipart/form-data; boundary=------ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("------ABCDEFG".to_owned()));

        let content_type = "boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain; boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());
    }

    #[test]
    fn test_parse_boundary_is_verbatim() {
        // No unescaping: a quoted token is taken as-is, quotes included.
        let content_type = "multipart/form-data; boundary=\"XYZ\"";
        assert_eq!(parse_boundary(content_type), Ok("\"XYZ\"".to_owned()));
    }

    #[test]
    fn test_parse_boundary_error_kind() {
        assert_eq!(
            parse_boundary("multipart/form-data"),
            Err(Error::MissingBoundary)
        );
    }
}
