//! Incremental UTF-8 decoding across chunk boundaries.

/// Bytes of an unfinished UTF-8 sequence carried from one chunk to the next.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, prefixed by any carried bytes, appending text to `out`.
    ///
    /// An incomplete sequence at the end of the input is held back for the
    /// next call. Invalid sequences decode to U+FFFD.
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        if self.pending.is_empty() {
            if let Ok(text) = std::str::from_utf8(chunk) {
                out.push_str(text);
                return;
            }
        }

        self.pending.extend_from_slice(chunk);
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                }
                Err(err) => {
                    let valid_end = start + err.valid_up_to();
                    out.push_str(validated(&self.pending[start..valid_end]));
                    if let Some(invalid_len) = err.error_len() {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + invalid_len;
                    } else {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
        self.pending.drain(..start);
    }

    /// Number of bytes waiting for the rest of their sequence.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any carried bytes, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

// Only called on the prefix `from_utf8` reported as valid.
fn validated(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap_or_default()
}

#[cfg(test)]
#[path = "utf8_test.rs"]
mod tests;
