//! Turn-taking between the user and the weather agent.
//!
//! A [`Conversation`] owns the transcript and the session state. Presentation code reads
//! snapshots and raises three intents: [`submit`](Conversation::submit),
//! [`react`](Conversation::react) and [`reset`](Conversation::reset). At most one turn is in
//! flight; a second submit while one is running is dropped, not queued.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use time::OffsetDateTime;

use crate::accumulating_stream::StreamReply;
use crate::error::Error;
use crate::observability::{TURN_DURATION, TURNS_FAILED, TURNS_SKIPPED, TURNS_STARTED};
use crate::transcript::Transcript;
use crate::types::{Message, MessageId, Reaction, Role};

const GENERIC_ERROR: &str = "An error occurred";

/// Where the conversation is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// No request outstanding; a new turn may start.
    Idle,
    /// A reply is streaming in.
    AwaitingResponse,
}

/// Why a submit did not start a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The prompt was empty or whitespace.
    EmptyPrompt,
    /// Another turn is still in flight.
    Busy,
}

/// How a submit ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Nothing happened; transcript and session state are unchanged.
    Skipped(SkipReason),
    /// The reply streamed to completion.
    Completed {
        /// Id of the assistant message, if any text arrived.
        reply_id: Option<MessageId>,
    },
    /// The turn failed; the error text is now the session's last error.
    Failed(Error),
}

impl TurnOutcome {
    /// Returns true if the turn ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }

    /// Returns true if the submit was a no-op.
    pub fn is_skipped(&self) -> bool {
        matches!(self, TurnOutcome::Skipped(_))
    }
}

/// A read-only copy of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    /// Messages in conversation order.
    pub messages: Vec<Message>,
    /// True while a turn is streaming.
    pub in_flight: bool,
    /// Error text from the most recent failed turn.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Transcript,
    in_flight: bool,
    last_error: Option<String>,
}

/// Orchestrates turns against a [`StreamReply`] source.
pub struct Conversation<R: StreamReply> {
    source: R,
    state: Mutex<SessionState>,
}

/// Clears the in-flight flag however the turn ends, including cancellation.
struct InFlightGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

impl<R: StreamReply> Conversation<R> {
    /// Creates an empty conversation backed by `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The reply source.
    pub fn source(&self) -> &R {
        &self.source
    }

    /// Submits a prompt and streams the reply into the transcript.
    pub async fn submit(&self, prompt: &str) -> TurnOutcome {
        self.submit_with_progress(prompt, |_| {}).await
    }

    /// Like [`submit`](Self::submit), also calling `progress` with the full reply text each
    /// time it grows, after the transcript has been updated.
    pub async fn submit_with_progress<F>(&self, prompt: &str, mut progress: F) -> TurnOutcome
    where
        F: FnMut(&str) + Send,
    {
        if prompt.trim().is_empty() {
            TURNS_SKIPPED.click();
            return TurnOutcome::Skipped(SkipReason::EmptyPrompt);
        }

        {
            let mut state = self.state();
            if state.in_flight {
                TURNS_SKIPPED.click();
                tracing::debug!("submit ignored while a turn is in flight");
                return TurnOutcome::Skipped(SkipReason::Busy);
            }
            if let Err(err) = state.transcript.append(Message::user(prompt)) {
                tracing::error!(error = %err, "user message rejected by transcript");
                return TurnOutcome::Failed(err);
            }
            state.last_error = None;
            state.in_flight = true;
        }
        let _guard = InFlightGuard { state: &self.state };
        TURNS_STARTED.click();
        let started = Instant::now();

        let reply_id = MessageId::generate();
        let mut on_update = |text: &str| {
            self.state().transcript.upsert(
                &reply_id,
                Role::Assistant,
                text,
                OffsetDateTime::now_utc(),
            );
            progress(text);
        };
        let result = self.source.stream_reply(prompt, &mut on_update).await;
        TURN_DURATION.add(started.elapsed().as_secs_f64());

        match result {
            Ok(_) => {
                let reply_id = self.state().transcript.contains(&reply_id).then_some(reply_id);
                TurnOutcome::Completed { reply_id }
            }
            Err(err) => {
                TURNS_FAILED.click();
                tracing::warn!(error = %err, "turn failed");
                self.state().last_error = Some(error_text(&err));
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Toggles a reaction on an assistant message.
    ///
    /// Returns the resulting reaction, or `None` when no assistant message has `id`.
    pub fn react(&self, id: &MessageId, reaction: Reaction) -> Option<Option<Reaction>> {
        self.state().transcript.set_reaction(id, reaction)
    }

    /// Clears the transcript and the last error.
    ///
    /// An in-flight turn keeps running; callers disable this intent while one is in flight.
    pub fn reset(&self) {
        let mut state = self.state();
        state.transcript.clear();
        state.last_error = None;
    }

    /// Hides the last error without starting a turn.
    pub fn dismiss_error(&self) {
        self.state().last_error = None;
    }

    /// The current turn state.
    pub fn turn_state(&self) -> TurnState {
        if self.state().in_flight {
            TurnState::AwaitingResponse
        } else {
            TurnState::Idle
        }
    }

    /// Returns true while a turn is streaming.
    pub fn in_flight(&self) -> bool {
        self.state().in_flight
    }

    /// Error text from the most recent failed turn.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Returns true if there is anything to share or clear.
    pub fn has_messages(&self) -> bool {
        !self.state().transcript.is_empty()
    }

    /// A copy of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.state().transcript.clone()
    }

    /// A copy of everything the presentation layer renders.
    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state();
        ConversationSnapshot {
            messages: state.transcript.messages().to_vec(),
            in_flight: state.in_flight,
            last_error: state.last_error.clone(),
        }
    }
}

fn error_text(err: &Error) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        GENERIC_ERROR.to_string()
    } else {
        text
    }
}
