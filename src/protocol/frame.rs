//! Frame Codec
//!
//! Byte-exact parser and encoders for the request/response framing.
//!
//! A request frame is `*<N>\r\n` followed by N bulk strings, each
//! `$<len>\r\n<len bytes>\r\n`. Bulk payloads are read by length, so keys may
//! contain any bytes including newlines. Replies are simple strings
//! (`+TEXT\r\n`), bulk strings (`$<len>\r\n<bytes>\r\n`), the null bulk
//! (`$-1\r\n`), and errors (`-Error MESSAGE\r\n`).

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{ProxyError, Result};

/// Upper bound on elements in one request frame.
const MAX_FRAME_ELEMENTS: i64 = 64;

/// Upper bound on one bulk string payload (1 MB).
const MAX_BULK_LEN: i64 = 1024 * 1024;

// == Decoding ==

/// Reads one request frame, returning its elements in order.
///
/// Returns `Ok(None)` on a clean end of stream before any frame byte.
/// Malformed input (bad leading byte, non-integer or oversized count or
/// length, premature EOF mid-frame) is a [`ProxyError::Protocol`]; transport
/// failures surface as [`ProxyError::Io`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if read_header_line(reader, &mut line).await? == 0 {
        return Ok(None);
    }

    let count = parse_prefixed_int(&line, '*')?;
    if count < 0 {
        return Err(ProxyError::Protocol("negative element count".to_string()));
    }
    // Declared sizes are untrusted input; bound them before allocating.
    if count > MAX_FRAME_ELEMENTS {
        return Err(ProxyError::Protocol(format!(
            "element count {} exceeds limit of {}",
            count, MAX_FRAME_ELEMENTS
        )));
    }

    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        elements.push(read_bulk_string(reader).await?);
    }
    Ok(Some(elements))
}

/// Reads one `$<len>\r\n<len bytes>\r\n` element.
async fn read_bulk_string<R>(reader: &mut R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if read_header_line(reader, &mut line).await? == 0 {
        return Err(ProxyError::Protocol(
            "unexpected end of stream inside frame".to_string(),
        ));
    }

    let len = parse_prefixed_int(&line, '$')?;
    // A nil bulk string is legal in replies but meaningless in a request.
    if len < 0 {
        return Err(ProxyError::Protocol(
            "nil bulk string not allowed in requests".to_string(),
        ));
    }
    if len > MAX_BULK_LEN {
        return Err(ProxyError::Protocol(format!(
            "bulk string length {} exceeds limit of {}",
            len, MAX_BULK_LEN
        )));
    }

    let len = len as usize;
    let mut payload = vec![0u8; len + 2];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProxyError::Protocol("unexpected end of stream inside frame".to_string())
        } else {
            ProxyError::Io(e)
        }
    })?;

    if &payload[len..] != b"\r\n" {
        return Err(ProxyError::Protocol(
            "bulk string missing CRLF terminator".to_string(),
        ));
    }

    payload.truncate(len);
    String::from_utf8(payload)
        .map_err(|_| ProxyError::Protocol("bulk string is not valid utf-8".to_string()))
}

/// Reads one header line, treating undecodable bytes as a framing error
/// rather than a transport failure so the caller still answers with an
/// error reply before closing.
async fn read_header_line<R>(reader: &mut R, line: &mut String) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    reader.read_line(line).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            ProxyError::Protocol("frame header is not valid utf-8".to_string())
        } else {
            ProxyError::Io(e)
        }
    })
}

/// Parses `<prefix><integer>` out of one protocol line.
fn parse_prefixed_int(line: &str, prefix: char) -> Result<i64> {
    let line = line.trim_end_matches(['\r', '\n']);
    let digits = line.strip_prefix(prefix).ok_or_else(|| {
        ProxyError::Protocol(format!("expected '{}' prefix, got {:?}", prefix, line))
    })?;
    digits
        .parse()
        .map_err(|_| ProxyError::Protocol(format!("invalid integer in {:?}", line)))
}

// == Encoding ==

/// Encodes a simple string reply: `+TEXT\r\n`.
pub fn simple_string(value: &str) -> Vec<u8> {
    format!("+{}\r\n", value).into_bytes()
}

/// Encodes a bulk string reply; `None` becomes the null bulk `$-1\r\n`.
pub fn bulk_string(value: Option<&str>) -> Vec<u8> {
    match value {
        Some(v) => format!("${}\r\n{}\r\n", v.len(), v).into_bytes(),
        None => b"$-1\r\n".to_vec(),
    }
}

/// Encodes an error reply: `-Error MESSAGE\r\n`.
pub fn error_reply(message: &str) -> Vec<u8> {
    format!("-Error {}\r\n", message).into_bytes()
}

/// Encodes a request frame from its elements.
pub fn array(elements: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", elements.len()).into_bytes();
    for element in elements {
        out.extend_from_slice(&bulk_string(Some(element)));
    }
    out
}
