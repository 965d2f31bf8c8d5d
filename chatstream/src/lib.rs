//! Incremental decoder for server-sent-events chat streams.
//!
//! DESIGN
//! ======
//! The study-assistant proxy answers with an OpenAI-style SSE body:
//! `data: {json}` lines, `:` comment lines, blank separators, and a final
//! `data: [DONE]`. Bytes arrive in arbitrary chunks, so a line (or a UTF-8
//! sequence) may be split anywhere. [`StreamDecoder`] owns all per-request
//! state; the read loop feeds it one chunk at a time and calls
//! [`StreamDecoder::finish`] when the body closes without the sentinel.
//!
//! Every [`DecodeEvent::Snapshot`] carries the full assistant text so far,
//! never a delta. Display layers replace what they show with it.
//!
//! TRADE-OFFS
//! ==========
//! A complete `data:` line whose JSON does not parse is pushed back onto the
//! front of the buffer and retried when more bytes arrive. Consecutive
//! retries and total buffered bytes are both bounded by [`DecoderLimits`];
//! crossing either is a fatal [`DecodeError`] rather than a silent stall.

mod utf8;

pub use utf8::Utf8Carry;

use serde_json::Value;
use tracing::{debug, warn};

/// Prefix of a payload-carrying line.
pub const DATA_PREFIX: &str = "data: ";
/// Payload marking the logical end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

pub const DEFAULT_MAX_REBUFFER_ATTEMPTS: u32 = 16;
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 1024 * 1024;

// =============================================================================
// ERROR
// =============================================================================

/// Fatal conditions that end a decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A complete data line kept failing to parse across chunks.
    #[error("data line still unparseable after {attempts} re-buffers")]
    RebufferLimit { attempts: u32 },

    /// Undelimited text grew past the configured bound.
    #[error("stream buffer grew to {len} bytes (limit {limit})")]
    BufferOverflow { len: usize, limit: usize },
}

// =============================================================================
// TYPES
// =============================================================================

/// Bounds on how much unconsumed input a decoder will hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    pub max_rebuffer_attempts: u32,
    pub max_buffer_bytes: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self { max_rebuffer_attempts: DEFAULT_MAX_REBUFFER_ATTEMPTS, max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES }
    }
}

/// Output of one decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// The complete assistant text accumulated so far.
    Snapshot(String),
    /// The `[DONE]` sentinel was seen; nothing further will be decoded.
    Done,
}

enum Line<'a> {
    Skip,
    Done,
    Payload(&'a str),
}

// =============================================================================
// DECODER
// =============================================================================

/// Per-request decode state. One consumer at a time; not shared.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    utf8: Utf8Carry,
    text_buffer: String,
    assistant_so_far: String,
    done: bool,
    closed: bool,
    rebuffer_attempts: u32,
    limits: DecoderLimits,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self { limits, ..Self::default() }
    }

    /// Consume one chunk of the response body.
    ///
    /// Chunks arriving after the sentinel or after [`StreamDecoder::finish`]
    /// are ignored. The size bound applies to what stays buffered once the
    /// complete lines in `chunk` are consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the buffered input exceeds the
    /// configured [`DecoderLimits`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<DecodeEvent>, DecodeError> {
        let mut events = Vec::new();
        if self.done || self.closed {
            debug!(len = chunk.len(), "chatstream: chunk after end ignored");
            return Ok(events);
        }

        self.utf8.decode_into(chunk, &mut self.text_buffer);
        self.drain_complete_lines(&mut events)?;
        if !self.done {
            self.check_buffer_size()?;
        }
        Ok(events)
    }

    /// Flush whatever is left once the body has closed without `[DONE]`.
    ///
    /// Lines that still fail to parse are dropped; there is no more input
    /// that could complete them. The decoder accepts no input afterwards.
    pub fn finish(&mut self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        if self.done || self.closed {
            return events;
        }
        self.closed = true;

        let dropped = self.utf8.clear();
        if dropped > 0 {
            debug!(dropped, "chatstream: incomplete utf-8 tail dropped at close");
        }

        let remainder = std::mem::take(&mut self.text_buffer);
        for raw in remainder.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            match classify(line) {
                Line::Skip => {}
                Line::Done => {
                    self.mark_done(&mut events);
                    break;
                }
                Line::Payload(payload) => match extract_delta(payload) {
                    Ok(Some(delta)) => self.push_delta(&delta, &mut events),
                    Ok(None) => {}
                    Err(e) => debug!(error = %e, "chatstream: trailing fragment discarded"),
                },
            }
        }
        events
    }

    /// Assistant text accumulated so far.
    #[must_use]
    pub fn assistant_text(&self) -> &str {
        &self.assistant_so_far
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes held between calls (undelimited text plus a partial UTF-8 tail).
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.text_buffer.len() + self.utf8.pending_len()
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.assistant_so_far
    }

    fn drain_complete_lines(&mut self, events: &mut Vec<DecodeEvent>) -> Result<(), DecodeError> {
        while let Some(newline) = self.text_buffer.find('\n') {
            let raw: String = self.text_buffer.drain(..=newline).collect();
            let line = strip_line_ending(&raw);

            match classify(line) {
                Line::Skip => {}
                Line::Done => {
                    self.mark_done(events);
                    return Ok(());
                }
                Line::Payload(payload) => match extract_delta(payload) {
                    Ok(delta) => {
                        self.rebuffer_attempts = 0;
                        if let Some(delta) = delta {
                            self.push_delta(&delta, events);
                        }
                    }
                    Err(e) => {
                        self.rebuffer_attempts += 1;
                        if self.rebuffer_attempts > self.limits.max_rebuffer_attempts {
                            warn!(attempts = self.rebuffer_attempts, "chatstream: re-buffer limit reached");
                            return Err(DecodeError::RebufferLimit { attempts: self.rebuffer_attempts });
                        }
                        debug!(error = %e, attempts = self.rebuffer_attempts, "chatstream: data line re-buffered");
                        self.rebuffer_line(line);
                        return Ok(());
                    }
                },
            }
        }
        Ok(())
    }

    fn rebuffer_line(&mut self, line: &str) {
        let mut restored = String::with_capacity(line.len() + 1 + self.text_buffer.len());
        restored.push_str(line);
        restored.push('\n');
        restored.push_str(&self.text_buffer);
        self.text_buffer = restored;
    }

    fn check_buffer_size(&self) -> Result<(), DecodeError> {
        let len = self.buffered_len();
        if len > self.limits.max_buffer_bytes {
            warn!(len, limit = self.limits.max_buffer_bytes, "chatstream: buffer limit reached");
            return Err(DecodeError::BufferOverflow { len, limit: self.limits.max_buffer_bytes });
        }
        Ok(())
    }

    fn push_delta(&mut self, delta: &str, events: &mut Vec<DecodeEvent>) {
        self.assistant_so_far.push_str(delta);
        events.push(DecodeEvent::Snapshot(self.assistant_so_far.clone()));
    }

    fn mark_done(&mut self, events: &mut Vec<DecodeEvent>) {
        self.done = true;
        events.push(DecodeEvent::Done);
    }
}

// =============================================================================
// LINE PARSING
// =============================================================================

fn strip_line_ending(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Skip;
    }
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Skip;
    };
    let payload = rest.trim();
    if payload == DONE_SENTINEL { Line::Done } else { Line::Payload(payload) }
}

/// Pull `choices[0].delta.content` out of a payload.
///
/// `Err` means the payload is not valid JSON (yet). Valid JSON without a
/// non-empty string delta yields `Ok(None)`.
fn extract_delta(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let root: Value = serde_json::from_str(payload)?;
    Ok(root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_owned))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
