use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{MessageId, Reaction, Role};

/// One entry in the chat transcript.
///
/// The role and timestamp are fixed at creation. Assistant content is replaced wholesale each
/// time the streamed reply grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id, the merge key for incremental updates.
    pub id: MessageId,

    /// Who wrote the message.
    pub role: Role,

    /// The full text body.
    pub content: String,

    /// When the message was created.
    #[serde(with = "crate::types::timestamp")]
    pub timestamp: OffsetDateTime,

    /// Reaction left by the user, assistant messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
}

impl Message {
    /// Create a message with an explicit id and timestamp.
    pub fn new(
        id: MessageId,
        role: Role,
        content: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp,
            reaction: None,
        }
    }

    /// Create a user message with a fresh id, stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(
            MessageId::generate(),
            Role::User,
            content,
            OffsetDateTime::now_utc(),
        )
    }

    /// Create an assistant message under a pre-allocated id, stamped now.
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content, OffsetDateTime::now_utc())
    }

    /// Returns true if the message was written by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if the message came from the agent.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
