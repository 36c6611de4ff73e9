use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A fragment of assistant text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDelta {
    /// The new text; may be empty, in which case it carries nothing.
    #[serde(rename = "textDelta", default)]
    pub text_delta: String,
}

impl TextDelta {
    /// Create a new `TextDelta` with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_delta: text.into(),
        }
    }
}

/// One structured event carried by a `data:` record of the agent's stream.
///
/// The set of shapes is closed. Anything that does not decode into a known shape, whether an
/// unknown `type` or a malformed payload, becomes [`AgentStreamEvent::Ignored`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentStreamEvent {
    /// An incremental piece of the reply text.
    #[serde(rename = "text-delta")]
    TextDelta(TextDelta),

    /// The agent finished producing the reply.
    #[serde(rename = "finish")]
    Finish {
        /// Why generation stopped, when reported.
        #[serde(rename = "finishReason", default)]
        finish_reason: Option<String>,
    },

    /// Any record the client does not consume.
    #[serde(other)]
    Ignored,
}

impl AgentStreamEvent {
    /// Decode a record payload, reporting malformed input as an error.
    pub fn from_data(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| Error::malformed_event(e.to_string(), data))
    }

    /// Decode a record payload, mapping malformed input to `Ignored`.
    pub fn parse(data: &str) -> Self {
        Self::from_data(data).unwrap_or(AgentStreamEvent::Ignored)
    }

    /// The text this event contributes to the reply, if any.
    pub fn delta(&self) -> Option<&str> {
        match self {
            AgentStreamEvent::TextDelta(delta) if !delta.text_delta.is_empty() => {
                Some(&delta.text_delta)
            }
            _ => None,
        }
    }
}
