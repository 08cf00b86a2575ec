// Newline-delimited JSON-RPC over stdin/stdout

use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::server::McpServer;
use anyhow::{Context, Result};
use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

/// Longest input line accepted; longer lines are skipped with a parse error.
pub const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;

/// Serve one MCP server over the process's stdin and stdout until stdin closes.
pub async fn serve_stdio(server: McpServer) -> Result<()> {
    serve(&server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve one MCP server over any line-oriented duplex channel.
///
/// Each line is one JSON-RPC message or batch; each response is written as one line.
/// Undecodable or oversized lines are answered with a parse error and skipped. Only
/// I/O failures end the loop early.
pub async fn serve<R, W>(server: &McpServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_lines(server, reader, writer, MAX_LINE_LENGTH).await
}

async fn serve_lines<R, W>(
    server: &McpServer,
    reader: R,
    writer: W,
    max_length: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = FramedRead::new(reader, JsonLines::new(max_length));
    let mut sink = FramedWrite::new(writer, LinesCodec::new());

    while let Some(frame) = frames.next().await {
        let response = match frame.context("Failed to read from input")? {
            Frame::TooLong => {
                warn!("Skipped input line longer than {} bytes", max_length);
                parse_error()
            }
            Frame::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match serde_json::from_str::<Value>(line) {
                    Ok(payload) => server.handle_payload(payload).await,
                    Err(e) => {
                        warn!("Failed to parse JSON-RPC message: {}", e);
                        parse_error()
                    }
                }
            }
        };

        if let Some(response) = response {
            let encoded = serde_json::to_string(&response)?;
            debug!("Sending response: {}", encoded);
            sink.send(encoded)
                .await
                .context("Failed to write response")?;
        }
    }

    info!("Input closed, stopping stdio transport");
    Ok(())
}

fn parse_error() -> Option<Value> {
    serde_json::to_value(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error())).ok()
}

/// One newline-terminated input frame
#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    TooLong,
}

/// Newline framing with lossy UTF-8 decoding and a cap on line length
struct JsonLines {
    max_length: usize,
    // Where to resume the newline search
    next_index: usize,
    discarding: bool,
}

impl JsonLines {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }
}

impl Decoder for JsonLines {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        let newline = buf[self.next_index..].iter().position(|b| *b == b'\n');

        match newline {
            Some(offset) => {
                let length = self.next_index + offset;
                let line = buf.split_to(length + 1);
                self.next_index = 0;

                if std::mem::take(&mut self.discarding) || length > self.max_length {
                    return Ok(Some(Frame::TooLong));
                }
                Ok(Some(Frame::Line(decode_line(&line[..length]))))
            }
            None if buf.len() > self.max_length => {
                // Drop the partial line and skip to the next newline
                buf.clear();
                self.next_index = 0;
                self.discarding = true;
                Ok(None)
            }
            None => {
                self.next_index = buf.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }

        self.next_index = 0;
        if std::mem::take(&mut self.discarding) {
            buf.clear();
            return Ok(Some(Frame::TooLong));
        }
        if buf.is_empty() {
            return Ok(None);
        }

        let line = buf.split();
        Ok(Some(Frame::Line(decode_line(&line))))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
