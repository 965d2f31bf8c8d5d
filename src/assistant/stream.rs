//! Read loop that pumps a response byte stream through a [`StreamDecoder`].

use std::fmt::Display;

use chatstream::{DecodeEvent, StreamDecoder};
use futures::{Stream, StreamExt};

use super::types::{AssistantError, ChatOutcome, Termination};

/// Drive `body` to completion, forwarding each snapshot to `on_snapshot`.
///
/// Stops reading as soon as the sentinel arrives. A transport error ends the
/// read with a single `Transport` error; a decoder bound breach ends it with
/// `Decode`. If the body closes without a sentinel, buffered lines are
/// flushed before returning.
///
/// # Errors
///
/// Returns `Transport` or `Decode` as described above.
pub async fn drive_stream<S, B, E>(
    body: S,
    mut decoder: StreamDecoder,
    on_snapshot: &mut (dyn for<'s> FnMut(&'s str) + Send),
) -> Result<ChatOutcome, AssistantError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut chunks = 0_usize;

    while let Some(next) = body.next().await {
        let chunk = next.map_err(|e| AssistantError::Transport(e.to_string()))?;
        chunks += 1;
        let events = decoder.feed(chunk.as_ref())?;
        if forward(events, on_snapshot) {
            tracing::debug!(chunks, "assistant: sentinel received");
            return Ok(ChatOutcome { text: decoder.into_text(), termination: Termination::Sentinel });
        }
    }

    let termination = if forward(decoder.finish(), on_snapshot) { Termination::Sentinel } else { Termination::Closed };
    tracing::debug!(chunks, ?termination, "assistant: body closed");
    Ok(ChatOutcome { text: decoder.into_text(), termination })
}

/// Hand snapshots to the callback; true once `Done` is seen.
fn forward(events: Vec<DecodeEvent>, on_snapshot: &mut (dyn for<'s> FnMut(&'s str) + Send)) -> bool {
    let mut done = false;
    for event in events {
        match event {
            DecodeEvent::Snapshot(text) => on_snapshot(&text),
            DecodeEvent::Done => done = true,
        }
    }
    done
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
