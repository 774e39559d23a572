//! `Content-Length` framing for the Copilot CLI connection.
//!
//! Each message is a header block terminated by an empty line followed by
//! exactly `Content-Length` bytes of JSON:
//!
//! ```text
//! Content-Length: 42\r\n
//! \r\n
//! {"jsonrpc":"2.0","id":1,"method":"..."}
//! ```

use crate::copilot::error::{CopilotError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Read one frame body. Returns `Ok(None)` on a clean end of stream
/// between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut content_length: Option<usize> = None;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return match content_length {
                None => Ok(None),
                Some(_) => Err(CopilotError::TransportClosed),
            };
        }

        let header = line.trim();
        if header.is_empty() {
            // Blank lines before the first header are tolerated.
            match content_length {
                Some(len) => {
                    let mut body = vec![0u8; len];
                    reader.read_exact(&mut body).await?;
                    trace!("Frame received ({} bytes)", len);
                    return Ok(Some(body));
                }
                None => continue,
            }
        }

        if let Some((name, value)) = header.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            let len = value
                .trim()
                .parse::<usize>()
                .map_err(|_| CopilotError::MalformedFrame(header.to_string()))?;
            content_length = Some(len);
        }
    }
}

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, body: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    trace!("Frame sent: {}", body);
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
