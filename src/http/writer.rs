use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Space allotted to the status line and headers.
pub const MAX_HEAD_SIZE: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializeError {
    #[error("response head is {len} bytes, limit is {limit}")]
    HeadersTooLarge { len: usize, limit: usize },
    #[error("response size overflows usize")]
    ResponseTooLarge,
}

/// Renders a response into wire bytes.
///
/// The head is formatted as text; the body is appended verbatim, so binary
/// payloads pass through untouched.
pub fn serialize_response(resp: &Response) -> Result<Bytes, SerializeError> {
    let head = format!(
        "{version} {code} {reason}\r\n\
         Date: {date}\r\n\
         Server: {server}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {length}\r\n\
         Connection: {connection}\r\n\
         \r\n",
        version = resp.version(),
        code = resp.status.as_u16(),
        reason = resp.status.reason_phrase(),
        date = resp.date,
        server = resp.server,
        content_type = resp.content_type,
        length = resp.content_length(),
        connection = resp.connection(),
    );

    if head.len() > MAX_HEAD_SIZE {
        return Err(SerializeError::HeadersTooLarge {
            len: head.len(),
            limit: MAX_HEAD_SIZE,
        });
    }

    let body = resp.body().unwrap_or_default();
    let total = head
        .len()
        .checked_add(body.len())
        .ok_or(SerializeError::ResponseTooLarge)?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_slice(head.as_bytes());

    // Body
    buf.put_slice(body);

    Ok(buf.freeze())
}

pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Result<Self, SerializeError> {
        Ok(Self {
            buffer: serialize_response(response)?,
            written: 0,
        })
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
