//! Server-Sent Events (SSE) frame decoding.
//!
//! The API streams results as SSE lines:
//! ```text
//! data: {"content": "fn ", "stop": false}
//!
//! : ping - 2024-01-01 00:00:00
//!
//! data: {"final_content": "fn main() {}", "stop": true, ...}
//! ```
//!
//! Only `data: ` lines are forwarded. Comments, keep-alive pings and other
//! fields are skipped.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;

const DATA_PREFIX: &str = "data: ";

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use docline::sse::SSEResponseExt;
///
/// let response = http.post(url).send().await?;
/// let mut frames = response.sse();
/// while let Some(frame) = frames.next().await {
///     println!("SSE data: {}", frame?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of `data:` payloads.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_frames(self.bytes_stream())
    }
}

/// Decode an arbitrary byte stream into SSE `data:` payloads.
///
/// Payloads are yielded in wire order. A transport error is yielded once and
/// ends the stream.
pub fn sse_frames<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError>,
{
    stream::unfold(
        (Box::pin(byte_stream), FrameDecoder::new(), Vec::new().into_iter(), false),
        |(mut byte_stream, mut decoder, mut pending, mut stream_ended)| async move {
            loop {
                if let Some(data) = pending.next() {
                    return Some((Ok(data), (byte_stream, decoder, pending, stream_ended)));
                }

                if stream_ended {
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        pending = decoder.push(&chunk).into_iter();
                    }
                    Some(Err(e)) => {
                        // Nothing after a transport error is trustworthy
                        stream_ended = true;
                        return Some((Err(e.into()), (byte_stream, decoder, pending, stream_ended)));
                    }
                    None => {
                        stream_ended = true;
                        pending = decoder.finish().into_iter().collect::<Vec<_>>().into_iter();
                    }
                }
            }
        },
    )
}

/// Incremental line decoder.
///
/// Bytes are buffered until a full line is available, so frames that straddle
/// chunk boundaries (including split multi-byte characters) come out intact.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes and return the payloads of every completed `data:` line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let pos = self.scanned + offset;
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.scanned = 0;
            let line = String::from_utf8_lossy(&line[..pos]);
            if let Some(data) = parse_sse_line(&line) {
                frames.push(data.to_string());
            }
        }
        self.scanned = self.buffer.len();
        frames
    }

    /// Flush an unterminated trailing line once the byte stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        self.scanned = 0;
        let line = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&line);
        parse_sse_line(&line).map(str::to_string)
    }
}

/// Parse an SSE line to extract the data portion.
///
/// The payload after `data: ` is returned verbatim, minus a trailing `\r`.
/// Empty payloads are server pings and yield `None`.
///
/// # Example
/// ```
/// use docline::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"key\": \"value\"}"), Some("{\"key\": \"value\"}"));
/// assert_eq!(parse_sse_line(": ping"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_prefix(DATA_PREFIX).filter(|data| !data.is_empty())
}
