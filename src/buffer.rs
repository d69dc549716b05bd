use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::future::poll_fn;
use futures_util::stream::Stream;

/// Buffered single-cursor reader over a stream of byte chunks.
///
/// The cursor is exclusively owned by the decode operation in progress; every
/// suspension point of the decoder is one of the async reads below. Chunks are
/// accumulated into `buf` as the underlying stream yields them and handed out
/// by splitting, so content bytes are never copied twice.
pub(crate) struct StreamBuffer<'r> {
    pub(crate) eof: bool,
    pub(crate) buf: BytesMut,
    stream: Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send + 'r>>,
}

impl<'r> StreamBuffer<'r> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = crate::Result<Bytes>> + Send + 'r,
    {
        StreamBuffer {
            eof: false,
            buf: BytesMut::new(),
            stream: Box::pin(stream),
        }
    }

    /// Drains every chunk the stream has ready right now into `buf`.
    fn poll_stream(&mut self, cx: &mut Context) -> crate::Result<()> {
        if self.eof {
            return Ok(());
        }

        loop {
            match self.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(data))) => self.buf.extend_from_slice(&data),
                Poll::Ready(Some(Err(err))) => return Err(err),
                Poll::Ready(None) => {
                    self.eof = true;
                    return Ok(());
                }
                Poll::Pending => return Ok(()),
            }
        }
    }

    /// Suspends until at least `target` bytes are buffered or the stream is
    /// exhausted, whichever comes first.
    async fn fill_to(&mut self, target: usize) -> crate::Result<()> {
        poll_fn(|cx| {
            if let Err(err) = self.poll_stream(cx) {
                return Poll::Ready(Err(err));
            }
            if self.buf.len() >= target || self.eof {
                Poll::Ready(Ok(()))
            } else {
                Poll::Pending
            }
        })
        .await
    }

    /// Suspends until the buffer has grown by at least one chunk or the
    /// stream is exhausted.
    async fn fill_more(&mut self) -> crate::Result<()> {
        let have = self.buf.len();
        poll_fn(|cx| {
            if let Err(err) = self.poll_stream(cx) {
                return Poll::Ready(Err(err));
            }
            if self.buf.len() > have || self.eof {
                Poll::Ready(Ok(()))
            } else {
                Poll::Pending
            }
        })
        .await
    }

    /// Reads one line, consuming it including the delimiter but returning it
    /// without the trailing CRLF (or lone LF). Returns `None` once the stream
    /// is exhausted; a final unterminated line is returned as-is.
    pub async fn read_line(&mut self) -> crate::Result<Option<Bytes>> {
        loop {
            if let Some(pos) = memchr::memchr(b'\n', &self.buf) {
                let mut line = self.buf.split_to(pos + 1);
                line.truncate(pos);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(line.freeze()));
            }

            if self.eof {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.buf.split().freeze()))
                };
            }

            self.fill_more().await?;
        }
    }

    /// Bounded look-ahead: returns up to `limit` buffered bytes without
    /// consuming them. Shorter than `limit` only when the stream ends first;
    /// the window is clamped to what is available rather than failing.
    pub async fn peek(&mut self, limit: usize) -> crate::Result<&[u8]> {
        self.fill_to(limit).await?;
        let available = self.buf.len().min(limit);
        Ok(&self.buf[..available])
    }

    /// Consumes exactly `count` bytes out of the buffer. Only valid for bytes
    /// a preceding `peek` has made resident; clamped to the buffered length.
    pub fn consume(&mut self, count: usize) -> Bytes {
        let count = count.min(self.buf.len());
        self.buf.split_to(count).freeze()
    }
}
