use std::convert::TryFrom;

use bytes::BytesMut;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use httparse::Header;

use crate::buffer::StreamBuffer;
use crate::constants;

/// Reads a field's header block: successive `Key: Value` lines up to and
/// including the terminating blank line, returned as a case-insensitive map.
///
/// The reader is left positioned at the first body byte. Returns `Ok(None)`
/// when the stream ends before any header line; an unparsable line fails with
/// [`MalformedHeader`](crate::Error::MalformedHeader).
pub(crate) async fn read_header_block(
    buffer: &mut StreamBuffer<'_>,
) -> crate::Result<Option<HeaderMap>> {
    let mut block = BytesMut::new();

    loop {
        let line = match buffer.read_line().await? {
            Some(line) => line,
            None => {
                if block.is_empty() {
                    return Ok(None);
                }
                break;
            }
        };

        if line.is_empty() {
            break;
        }

        block.extend_from_slice(&line);
        block.extend_from_slice(constants::CRLF.as_bytes());
    }

    // httparse wants the terminating empty line present in the block.
    block.extend_from_slice(constants::CRLF.as_bytes());

    let mut raw = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];
    match httparse::parse_headers(&block, &mut raw) {
        Ok(httparse::Status::Complete((_, raw_headers))) => to_header_map(raw_headers).map(Some),
        Ok(httparse::Status::Partial) => {
            Err(crate::Error::MalformedHeader("incomplete header block".into()))
        }
        Err(err) => Err(crate::Error::MalformedHeader(err.into())),
    }
}

fn to_header_map(raw_headers: &[Header]) -> crate::Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(raw_headers.len());

    for raw_header in raw_headers {
        let name = HeaderName::try_from(raw_header.name)
            .map_err(|err| crate::Error::MalformedHeader(err.into()))?;
        let value = HeaderValue::try_from(raw_header.value)
            .map_err(|err| crate::Error::MalformedHeader(err.into()))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;

    fn buffer_over(data: &str) -> StreamBuffer<'static> {
        let chunks: Vec<crate::Result<Bytes>> = data
            .as_bytes()
            .chunks(1)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        StreamBuffer::new(stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_reads_case_insensitive_map() {
        let mut buffer =
            buffer_over("Content-Disposition: form-data; name=\"a\"\r\nContent-Type: text/plain\r\n\r\nbody");
        let headers = read_header_block(&mut buffer).await.unwrap().unwrap();

        assert_eq!(
            headers.get("content-disposition").unwrap(),
            "form-data; name=\"a\""
        );
        assert_eq!(headers.get("CONTENT-TYPE").unwrap(), "text/plain");
        // The blank line is consumed; the body byte is next.
        assert_eq!(buffer.peek(4).await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn test_empty_block() {
        let mut buffer = buffer_over("\r\nbody");
        let headers = read_header_block(&mut buffer).await.unwrap().unwrap();
        assert!(headers.is_empty());
        assert_eq!(buffer.peek(4).await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn test_exhausted_stream_yields_none() {
        let mut buffer = buffer_over("");
        assert_eq!(read_header_block(&mut buffer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_without_colon_is_malformed() {
        let mut buffer = buffer_over("no colon here\r\n\r\n");
        let err = read_header_block(&mut buffer).await.unwrap_err();
        assert!(matches!(err, crate::Error::MalformedHeader(_)));
    }
}
