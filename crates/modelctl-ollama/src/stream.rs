//! Incremental decoder for Ollama's NDJSON generation streams.
//!
//! The decoder is a pure per-fragment state machine so it can be tested
//! without a network connection; the adapter feeds it raw byte fragments
//! exactly as they arrive.

use thiserror::Error;

use crate::api::GenerateRecord;

/// Errors produced while decoding a generation stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A newline-delimited segment failed to parse as a JSON record.
    /// This aborts the whole call; accumulated content is discarded.
    #[error("malformed stream record: {line}")]
    MalformedRecord {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What a completed stream decoded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResponse {
    /// All `response` fragments concatenated in arrival order.
    pub content: String,
    /// Token count from the terminal `done:true` record, when present.
    pub eval_count: Option<u32>,
}

/// Accumulates `response` text across the records of one stream.
///
/// Each fragment must split cleanly into complete newline-terminated JSON
/// records; records spanning fragment boundaries are not buffered and
/// surface as [`StreamError::MalformedRecord`]. That matches the wire
/// behavior of a local Ollama server, which flushes whole records.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    content: String,
    eval_count: Option<u32>,
}

impl NdjsonDecoder {
    /// Create a decoder with an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one fragment of bytes from the stream.
    ///
    /// Splits the fragment on newlines, discards empty segments, parses
    /// each remaining segment as a record, appends its `response` text to
    /// the accumulator, and hands exactly the new text to `on_chunk`.
    pub fn push_fragment<'a, 'b>(
        &mut self,
        fragment: &[u8],
        mut on_chunk: Option<&'a mut (dyn FnMut(&str) + Send + 'b)>,
    ) -> Result<(), StreamError> {
        let text = String::from_utf8_lossy(fragment);
        for line in text.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let record: GenerateRecord =
                serde_json::from_str(line).map_err(|source| StreamError::MalformedRecord {
                    line: line.to_string(),
                    source,
                })?;

            // The terminal record carries an empty `response`; only real
            // fragments reach the accumulator and the observer.
            if let Some(piece) = record.response.filter(|piece| !piece.is_empty()) {
                self.content.push_str(&piece);
                if let Some(cb) = on_chunk.as_mut() {
                    cb(&piece);
                }
            }
            if record.done {
                self.eval_count = record.eval_count;
            }
        }
        Ok(())
    }

    /// Consume the decoder at end-of-stream.
    #[must_use]
    pub fn finish(self) -> DecodedResponse {
        DecodedResponse {
            content: self.content,
            eval_count: self.eval_count,
        }
    }
}
