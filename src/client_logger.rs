//! Logging trait for weather agent traffic.
//!
//! Implement [`ClientLogger`] and attach it with [`WeatherAgent::with_logger`] to record every
//! event decoded from the agent's stream and every finished reply.
//!
//! [`WeatherAgent::with_logger`]: crate::WeatherAgent::with_logger

use crate::types::AgentStreamEvent;

/// A trait for observing streamed replies.
///
/// # Example
///
/// ```rust,ignore
/// use weather_chat::{AgentStreamEvent, ClientLogger};
/// use std::sync::Mutex;
///
/// struct Recorder {
///     lines: Mutex<Vec<String>>,
/// }
///
/// impl ClientLogger for Recorder {
///     fn log_stream_event(&self, event: &AgentStreamEvent) {
///         self.lines.lock().unwrap().push(format!("{event:?}"));
///     }
///
///     fn log_reply(&self, prompt: &str, reply: &str) {
///         self.lines.lock().unwrap().push(format!("{prompt} => {reply}"));
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Called for each decoded event, including ignored ones.
    fn log_stream_event(&self, event: &AgentStreamEvent);

    /// Called once when a stream ends cleanly, with the prompt and the full reply text.
    fn log_reply(&self, prompt: &str, reply: &str);
}
