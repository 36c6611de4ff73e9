//! Server-sent event framing for the agent's reply stream.
//!
//! The agent answers with newline-delimited text. Every line that starts with `data:` carries
//! one JSON event; every other line is framing noise and is skipped. Bytes are buffered until a
//! full line is available, so records and multi-byte characters may be split across chunks.

use std::time::Instant;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_EVENTS, STREAM_IGNORED_EVENTS};
use crate::types::AgentStreamEvent;
use crate::{Error, Result};

const DATA_PREFIX: &str = "data:";

struct SseState<S> {
    stream: S,
    buffer: Vec<u8>,
    done: bool,
    started: Instant,
}

/// Process a stream of bytes into a stream of agent events.
///
/// Transport failures and undecodable bytes are yielded once as `Err` and end the stream.
/// Malformed records never fail the stream; they surface as [`AgentStreamEvent::Ignored`].
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<AgentStreamEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let state = SseState {
        stream,
        buffer: Vec::new(),
        done: false,
        started: Instant::now(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(line) = take_line(&mut state.buffer) {
                match decode_record(&line) {
                    Ok(Some(event)) => return Some((Ok(event), state)),
                    Ok(None) => continue,
                    Err(e) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
            }

            match state.stream.next().await {
                Some(Ok(bytes)) => {
                    STREAM_BYTES.count(bytes.len() as u64);
                    state.buffer.extend_from_slice(&bytes);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    tracing::debug!(
                        elapsed_ms = state.started.elapsed().as_millis() as u64,
                        "agent stream closed"
                    );
                    if state.buffer.is_empty() {
                        return None;
                    }
                    let line = std::mem::take(&mut state.buffer);
                    match decode_record(&line) {
                        Ok(Some(event)) => return Some((Ok(event), state)),
                        Ok(None) => return None,
                        Err(e) => return Some((Err(e), state)),
                    }
                }
            }
        }
    })
}

/// Remove and return the first complete line, including its `\n`.
fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.iter().position(|b| *b == b'\n')?;
    Some(buffer.drain(..=end).collect())
}

/// Decode one raw line into an event.
///
/// Returns `Ok(None)` for lines that are not `data:` records.
fn decode_record(raw: &[u8]) -> Result<Option<AgentStreamEvent>> {
    let line = std::str::from_utf8(raw)?;
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    STREAM_EVENTS.click();
    let event = match AgentStreamEvent::from_data(payload) {
        Ok(event) => event,
        Err(err) => {
            tracing::debug!(error = %err, "discarding malformed stream record");
            AgentStreamEvent::Ignored
        }
    };
    if event == AgentStreamEvent::Ignored {
        STREAM_IGNORED_EVENTS.click();
    }
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextDelta;
    use futures::stream;

    async fn collect_bytes(chunks: Vec<Bytes>) -> Vec<Result<AgentStreamEvent>> {
        let stream = stream::iter(chunks.into_iter().map(Ok));
        process_sse(stream).collect().await
    }

    async fn collect(chunks: &[&str]) -> Vec<Result<AgentStreamEvent>> {
        collect_bytes(
            chunks
                .iter()
                .map(|c| Bytes::copy_from_slice(c.as_bytes()))
                .collect(),
        )
        .await
    }

    fn delta(text: &str) -> AgentStreamEvent {
        AgentStreamEvent::TextDelta(TextDelta::new(text))
    }

    #[tokio::test]
    async fn parse_text_delta() {
        let events = collect(&["data: {\"type\":\"text-delta\",\"textDelta\":\"Sun\"}\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &delta("Sun"));
    }

    #[tokio::test]
    async fn parse_multiple_records_in_one_chunk() {
        let events = collect(&[
            "data: {\"type\":\"text-delta\",\"textDelta\":\"Sun\"}\n\ndata: {\"type\":\"text-delta\",\"textDelta\":\"ny\"}\n\n",
        ])
        .await;
        let events: Vec<_> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(events, vec![delta("Sun"), delta("ny")]);
    }

    #[tokio::test]
    async fn handle_split_record() {
        let events = collect(&[
            "data: {\"type\":\"text-",
            "delta\",\"textDelta\":\"Rain\"}\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &delta("Rain"));
    }

    #[tokio::test]
    async fn handle_split_multibyte_character() {
        // "°" is 0xC2 0xB0.
        let events = collect_bytes(vec![
            Bytes::from_static(b"data: {\"type\":\"text-delta\",\"textDelta\":\"18\xC2"),
            Bytes::from_static(b"\xB0C\"}\n"),
        ])
        .await;
        assert_eq!(events[0].as_ref().unwrap(), &delta("18°C"));
    }

    #[tokio::test]
    async fn skips_non_data_lines() {
        let events = collect(&[
            ": keep-alive\nevent: message\nid: 7\ndata: {\"type\":\"text-delta\",\"textDelta\":\"x\"}\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &delta("x"));
    }

    #[tokio::test]
    async fn accepts_crlf_and_missing_space() {
        let events = collect(&["data:{\"type\":\"text-delta\",\"textDelta\":\"y\"}\r\n"]).await;
        assert_eq!(events[0].as_ref().unwrap(), &delta("y"));
    }

    #[tokio::test]
    async fn malformed_record_is_ignored() {
        let events = collect(&["data: {not json\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &AgentStreamEvent::Ignored);
    }

    #[tokio::test]
    async fn trailing_record_without_newline() {
        let events = collect(&["data: {\"type\":\"text-delta\",\"textDelta\":\"end\"}"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &delta("end"));
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        let events = collect(&[]).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_ends_stream_with_error() {
        let events = collect_bytes(vec![
            Bytes::from_static(b"data: \xFF\xFE\n"),
            Bytes::from_static(b"data: {\"type\":\"text-delta\",\"textDelta\":\"never\"}\n"),
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(Error::Encoding { .. })));
    }
}
