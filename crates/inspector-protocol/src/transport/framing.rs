//! `Content-Length` framing over byte streams.
//!
//! Each frame is:
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```
//! Other headers are ignored. Lengths above [`MAX_FRAME_LEN`] are rejected
//! before any payload buffer is allocated.

use std::io::{self, BufRead, Write};

use super::Transport;
use crate::error::TransportError;

const CONTENT_LENGTH: &str = "Content-Length";

/// Largest payload a peer may announce, in bytes.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Writes framed messages to any byte sink.
#[derive(Debug)]
pub struct FramedWriter<W: Write> {
    writer: W,
}

impl<W: Write> FramedWriter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Borrows the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwraps the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for FramedWriter<W> {
    fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let header = format!("{CONTENT_LENGTH}: {}\r\n\r\n", message.len());
        self.writer.write_all(header.as_bytes())?;
        self.writer.write_all(message.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads framed messages from any buffered byte source.
#[derive(Debug)]
pub struct FrameReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> FrameReader<R> {
    /// Wraps a reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next frame, blocking until it is complete.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between frames.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MissingContentLength`] or
    /// [`TransportError::InvalidHeader`] for bad or oversized headers,
    /// [`TransportError::InvalidUtf8`] for a non-UTF-8 payload, and
    /// [`TransportError::Io`] if the stream fails or ends mid-frame.
    pub fn receive(&mut self) -> Result<Option<String>, TransportError> {
        let Some(content_length) = self.read_headers()? else {
            return Ok(None);
        };
        let mut content = vec![0_u8; content_length];
        self.reader.read_exact(&mut content)?;
        String::from_utf8(content)
            .map(Some)
            .map_err(|_| TransportError::InvalidUtf8)
    }

    fn read_headers(&mut self) -> Result<Option<usize>, TransportError> {
        let mut content_length = None;
        let mut saw_header = false;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if saw_header {
                    return Err(TransportError::from(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed while reading headers",
                    )));
                }
                return Ok(None);
            }
            saw_header = true;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            if let Some(length) = parse_content_length(trimmed)? {
                content_length = Some(length);
            }
        }

        content_length
            .map(Some)
            .ok_or(TransportError::MissingContentLength)
    }
}

fn parse_content_length(line: &str) -> Result<Option<usize>, TransportError> {
    let Some((name, value)) = line.split_once(':') else {
        return Err(TransportError::InvalidHeader);
    };
    if !name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
        return Ok(None);
    }
    match value.trim().parse::<usize>() {
        Ok(length) if length <= MAX_FRAME_LEN => Ok(Some(length)),
        _ => Err(TransportError::InvalidHeader),
    }
}
