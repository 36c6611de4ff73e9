//! Folds a stream of agent events into a single growing reply.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::{Stream, StreamExt};

use crate::client_logger::ClientLogger;
use crate::observability::{STREAM_DELTAS, STREAM_DURATION, STREAM_TTFD};
use crate::types::AgentStreamEvent;
use crate::Result;

/// Turns one prompt into a single growing reply.
///
/// Implementors call `on_update` with the full accumulated text after every fragment, strictly
/// in order and before reading further, then return the final text. Text already delivered
/// stays delivered when the call fails.
#[async_trait::async_trait]
pub trait StreamReply: Send + Sync {
    /// Stream the reply to `prompt`.
    async fn stream_reply(
        &self,
        prompt: &str,
        on_update: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String>;
}

/// A stream wrapper that accumulates text deltas.
///
/// Every item is the full reply so far. Events that carry no text are consumed silently; the
/// first error is passed through.
///
/// ```
/// # use futures::StreamExt;
/// # use weather_chat::{AccumulatingStream, AgentStreamEvent, TextDelta};
/// # tokio_test::block_on(async {
/// let events = futures::stream::iter(vec![
///     Ok(AgentStreamEvent::TextDelta(TextDelta::new("Sun"))),
///     Ok(AgentStreamEvent::Ignored),
///     Ok(AgentStreamEvent::TextDelta(TextDelta::new("ny"))),
/// ]);
/// let seen: Vec<String> = AccumulatingStream::new(events)
///     .map(|text| text.unwrap())
///     .collect()
///     .await;
/// assert_eq!(seen, vec!["Sun", "Sunny"]);
/// # });
/// ```
pub struct AccumulatingStream {
    inner: Pin<Box<dyn Stream<Item = Result<AgentStreamEvent>> + Send>>,
    text: String,
    logger: Option<Arc<dyn ClientLogger>>,
    started: Instant,
    saw_delta: bool,
}

impl AccumulatingStream {
    /// Wraps an event stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<AgentStreamEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
            text: String::new(),
            logger: None,
            started: Instant::now(),
            saw_delta: false,
        }
    }

    /// Reports every event to `logger` as it passes through.
    pub fn with_logger(mut self, logger: Option<Arc<dyn ClientLogger>>) -> Self {
        self.logger = logger;
        self
    }

    /// The reply accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the stream, returning the reply accumulated so far.
    pub fn into_text(self) -> String {
        self.text
    }

    fn accumulate_event(&mut self, event: &AgentStreamEvent) -> bool {
        if let Some(logger) = &self.logger {
            logger.log_stream_event(event);
        }
        match event.delta() {
            Some(delta) => {
                if !self.saw_delta {
                    self.saw_delta = true;
                    STREAM_TTFD.add(self.started.elapsed().as_secs_f64());
                }
                STREAM_DELTAS.click();
                self.text.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Drains the stream, calling `on_update` with the full text after every delta.
    ///
    /// # Errors
    ///
    /// Returns the first error the underlying stream yields.
    pub async fn drain(
        mut self,
        on_update: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String> {
        while let Some(update) = self.next().await {
            let text = update?;
            on_update(&text);
        }
        STREAM_DURATION.add(self.started.elapsed().as_secs_f64());
        Ok(self.text)
    }
}

impl Stream for AccumulatingStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.accumulate_event(&event) {
                        return Poll::Ready(Some(Ok(self.text.clone())));
                    }
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::types::TextDelta;
    use futures::stream;
    use std::sync::Mutex;

    fn delta(text: &str) -> Result<AgentStreamEvent> {
        Ok(AgentStreamEvent::TextDelta(TextDelta::new(text)))
    }

    #[tokio::test]
    async fn updates_carry_full_text() {
        let events = stream::iter(vec![delta("Sun"), delta("ny")]);
        let mut updates = Vec::new();
        let text = AccumulatingStream::new(events)
            .drain(&mut |t: &str| updates.push(t.to_string()))
            .await
            .unwrap();
        assert_eq!(updates, vec!["Sun".to_string(), "Sunny".to_string()]);
        assert_eq!(text, "Sunny");
    }

    #[tokio::test]
    async fn non_text_events_do_not_update() {
        let events = stream::iter(vec![
            Ok(AgentStreamEvent::Ignored),
            delta("Fog"),
            delta(""),
            Ok(AgentStreamEvent::Finish {
                finish_reason: Some("stop".to_string()),
            }),
        ]);
        let mut updates = Vec::new();
        let text = AccumulatingStream::new(events)
            .drain(&mut |t: &str| updates.push(t.to_string()))
            .await
            .unwrap();
        assert_eq!(updates, vec!["Fog".to_string()]);
        assert_eq!(text, "Fog");
    }

    #[tokio::test]
    async fn empty_stream_is_empty_reply() {
        let events = stream::iter(Vec::<Result<AgentStreamEvent>>::new());
        let mut calls = 0;
        let text = AccumulatingStream::new(events)
            .drain(&mut |_: &str| calls += 1)
            .await
            .unwrap();
        assert_eq!(calls, 0);
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn error_keeps_delivered_updates() {
        let events = stream::iter(vec![
            delta("Wind"),
            Err(Error::streaming("connection reset", None)),
            delta("never"),
        ]);
        let mut updates = Vec::new();
        let err = AccumulatingStream::new(events)
            .drain(&mut |t: &str| updates.push(t.to_string()))
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(updates, vec!["Wind".to_string()]);
    }

    #[tokio::test]
    async fn stream_items_are_cumulative() {
        let mut acc = AccumulatingStream::new(stream::iter(vec![delta("a"), delta("b")]));
        assert_eq!(acc.next().await.unwrap().unwrap(), "a");
        assert_eq!(acc.next().await.unwrap().unwrap(), "ab");
        assert!(acc.next().await.is_none());
        assert_eq!(acc.text(), "ab");
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<AgentStreamEvent>>,
    }

    impl ClientLogger for Recorder {
        fn log_stream_event(&self, event: &AgentStreamEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn log_reply(&self, _: &str, _: &str) {}
    }

    #[tokio::test]
    async fn logger_sees_every_event() {
        let recorder = Arc::new(Recorder::default());
        let events = stream::iter(vec![Ok(AgentStreamEvent::Ignored), delta("x")]);
        AccumulatingStream::new(events)
            .with_logger(Some(recorder.clone() as Arc<dyn ClientLogger>))
            .drain(&mut |_: &str| {})
            .await
            .unwrap();
        assert_eq!(recorder.events.lock().unwrap().len(), 2);
    }
}
