use std::convert::TryFrom;

use bytes::Bytes;
use futures_util::stream::{Stream, TryStreamExt};
use memchr::memmem;
#[cfg(feature = "tokio-io")]
use tokio::io::AsyncRead;
#[cfg(feature = "tokio-io")]
use tokio_util::io::ReaderStream;

use crate::boundary::BoundaryMarkers;
use crate::buffer::StreamBuffer;
use crate::content_disposition::ContentDisposition;
use crate::field::{FieldInfo, RawField};
use crate::form::Form;
use crate::headers;
use crate::options::FormOptions;

/// Streaming decoder for one `multipart/form-data` request body.
///
/// The decoder consumes the source stream strictly sequentially and holds at
/// most one field's look-ahead window (`max_field_size` plus the boundary
/// marker length) in memory at a time, besides the completed fields. The
/// resulting [`Form`] is materialized atomically by [`read_form`]: any error
/// aborts the decode and nothing partial is returned.
///
/// # Examples
///
/// ```
/// use formbound::FormReader;
/// use bytes::Bytes;
/// use std::convert::Infallible;
/// use futures_util::stream::once;
///
/// # async fn run() {
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhi\r\n--X-BOUNDARY--\r\n";
/// let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
/// let form = FormReader::new(stream, "X-BOUNDARY").read_form().await.unwrap();
///
/// assert_eq!(form.get("title").unwrap().first().text(), Some("hi"));
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
///
/// [`read_form`]: #method.read_form
pub struct FormReader<'r> {
    buffer: StreamBuffer<'r>,
    markers: BoundaryMarkers,
    options: FormOptions,
    /// Running remainder of the cumulative `max_file_size` budget.
    budget: u64,
}

impl<'r> FormReader<'r> {
    /// Constructs a `FormReader` over a [`Bytes`] chunk stream and the
    /// boundary token from the `Content-Type` header (see
    /// [`parse_boundary`](crate::parse_boundary)), with default
    /// [`FormOptions`].
    pub fn new<S, O, E, B>(stream: S, boundary: B) -> FormReader<'r>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'r,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
        B: AsRef<str>,
    {
        FormReader::with_options(stream, boundary, FormOptions::default())
    }

    /// Constructs a `FormReader` with explicit [`FormOptions`].
    pub fn with_options<S, O, E, B>(stream: S, boundary: B, options: FormOptions) -> FormReader<'r>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'r,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
        B: AsRef<str>,
    {
        let stream = stream
            .map_ok(|b| b.into())
            .map_err(|err| crate::Error::StreamReadFailed(err.into()));

        FormReader {
            buffer: StreamBuffer::new(stream),
            markers: BoundaryMarkers::derive(boundary.as_ref()),
            budget: options.max_file_size,
            options,
        }
    }

    /// Constructs a `FormReader` over an [`AsyncRead`] reader.
    ///
    /// # Optional
    ///
    /// This requires the optional `tokio-io` feature to be enabled.
    #[cfg(feature = "tokio-io")]
    pub fn with_reader<R, B>(reader: R, boundary: B) -> FormReader<'r>
    where
        R: AsyncRead + Send + 'r,
        B: AsRef<str>,
    {
        FormReader::new(ReaderStream::new(reader), boundary)
    }

    /// Constructs a `FormReader` over an [`AsyncRead`] reader with explicit
    /// [`FormOptions`].
    ///
    /// # Optional
    ///
    /// This requires the optional `tokio-io` feature to be enabled.
    #[cfg(feature = "tokio-io")]
    pub fn with_reader_with_options<R, B>(
        reader: R,
        boundary: B,
        options: FormOptions,
    ) -> FormReader<'r>
    where
        R: AsyncRead + Send + 'r,
        B: AsRef<str>,
    {
        FormReader::with_options(ReaderStream::new(reader), boundary, options)
    }

    /// Decodes the whole body into a [`Form`].
    ///
    /// Scans line by line for the start marker, then alternates header-block
    /// parsing and bounded body extraction until the end marker (or the end
    /// of the stream) is read. Lines that match neither marker are skipped.
    /// With `multiple` unset, decoding stops after the first extracted field
    /// and the rest of the stream is the caller's to drain or drop.
    pub async fn read_form(mut self) -> crate::Result<Form> {
        let mut form = Form::new();

        loop {
            let line = match self.buffer.read_line().await? {
                Some(line) => line,
                None => break,
            };

            if line == self.markers.end {
                break;
            }
            if line != self.markers.start {
                // Preamble or stray line between parts.
                continue;
            }

            let headers = headers::read_header_block(&mut self.buffer).await?;
            let disposition = headers
                .as_ref()
                .map(ContentDisposition::parse)
                .unwrap_or_default();

            let body = self
                .read_field_body(disposition.field_name.as_deref())
                .await?;
            log::trace!(
                "extracted field '{}': {} bytes, budget left {}",
                disposition.field_name.as_deref().unwrap_or("<unknown>"),
                body.len(),
                self.budget
            );

            let raw = RawField { headers, body };
            if let Some(info) = FieldInfo::classify(raw, disposition) {
                form.insert(info);
            }

            if !self.options.multiple {
                break;
            }
        }

        log::debug!("decoded form with {} field name(s)", form.len());
        Ok(form)
    }

    /// Bounded extraction of one field body.
    ///
    /// Looks ahead at most `max_field_size + marker.len()` bytes (clamped to
    /// what the stream can still supply) and searches the window for the
    /// `\r\n--boundary` marker byte-for-byte. The bytes preceding the marker
    /// are the body; the budget check happens before any of them are
    /// surfaced, and the trailing CRLF is consumed so the next line read
    /// lands on the marker itself.
    async fn read_field_body(&mut self, field_name: Option<&str>) -> crate::Result<Bytes> {
        let marker = &self.markers.repeated;
        let window = usize::try_from(self.options.max_field_size)
            .unwrap_or(usize::MAX)
            .saturating_add(marker.len());

        let lookahead = self.buffer.peek(window).await?;
        if lookahead.is_empty() {
            // Stream already exhausted: an empty field.
            return Ok(Bytes::new());
        }

        let content_len = match memmem::find(lookahead, marker) {
            Some(idx) => idx,
            None => {
                return Err(crate::Error::FieldSizeExceeded {
                    limit: self.options.max_field_size,
                    field_name: field_name.map(|name| name.to_owned()),
                });
            }
        };

        // Check before commit: reject without surfacing any content.
        let content_size = content_len as u64;
        if content_size > self.budget {
            return Err(crate::Error::TotalSizeExceeded {
                limit: self.options.max_file_size,
            });
        }
        self.budget -= content_size;

        let body = self.buffer.consume(content_len);
        // The CRLF that introduces the marker.
        self.buffer.consume(crate::constants::CRLF.len());

        Ok(body)
    }
}
