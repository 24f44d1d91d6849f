//! Newline-delimited JSON decoding for streamed generate responses.

use crate::error::{OllamaError, Result};
use crate::types::GenerateChunk;

/// Splits a byte stream into lines, independent of how the bytes were chunked.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every line completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8(line).map_err(|_| OllamaError::Utf8)?);
        }
        Ok(lines)
    }

    /// Flush the trailing line when the stream ends without a newline
    pub fn finish(self) -> Result<Option<String>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        String::from_utf8(self.buf)
            .map(Some)
            .map_err(|_| OllamaError::Utf8)
    }
}

/// Decode one response line. Blank lines yield `None`.
pub fn decode_line(line: &str) -> Result<Option<GenerateChunk>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|source| OllamaError::Decode {
        line: line.to_string(),
        source,
    })?;

    if let Some(error) = chunk.error {
        return Err(OllamaError::Server(error));
    }
    Ok(Some(chunk))
}

/// Concatenate the `response` fragments of a complete NDJSON body in order.
pub fn collect_response(body: &str) -> Result<String> {
    let mut text = String::new();
    for line in body.lines() {
        if let Some(GenerateChunk {
            response: Some(fragment),
            ..
        }) = decode_line(line)?
        {
            text.push_str(&fragment);
        }
    }
    Ok(text)
}
