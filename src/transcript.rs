//! The ordered, in-memory record of a conversation.
//!
//! Insertion order is display order is conversation order. The transcript performs no I/O.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::{Message, MessageId, Reaction, Role};

/// An ordered sequence of messages with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if a message with the same id is already present.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if self.contains(&message.id) {
            return Err(Error::duplicate_id(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Replaces the content of message `id`, or appends a new message if there is none.
    ///
    /// An existing message keeps its role, timestamp and reaction. A new message is created
    /// with `role`, `content` and `timestamp`.
    pub fn upsert(
        &mut self,
        id: &MessageId,
        role: Role,
        content: impl Into<String>,
        timestamp: OffsetDateTime,
    ) {
        let content = content.into();
        match self.get_mut(id) {
            Some(existing) => existing.content = content,
            None => self
                .messages
                .push(Message::new(id.clone(), role, content, timestamp)),
        }
    }

    /// Toggles `reaction` on message `id`.
    ///
    /// Setting the reaction that is already present clears it. Unknown ids and user messages
    /// are left untouched. Returns the resulting reaction when the message was updated.
    pub fn set_reaction(&mut self, id: &MessageId, reaction: Reaction) -> Option<Option<Reaction>> {
        let message = self.get_mut(id).filter(|m| m.is_assistant())?;
        message.reaction = reaction.toggle(message.reaction);
        Some(message.reaction)
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the message with `id`, if any.
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }

    /// Returns true if a message with `id` exists.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.get(id).is_some()
    }

    /// The messages in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterates over the messages in conversation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Iterates over the assistant replies in conversation order.
    pub fn assistant_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_assistant())
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn append_preserves_order() {
        let mut transcript = Transcript::new();
        let first = Message::user("one");
        let second = Message::user("two");
        transcript.append(first.clone()).unwrap();
        transcript.append(second.clone()).unwrap();
        assert_eq!(transcript.messages(), &[first, second]);
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let mut transcript = Transcript::new();
        let message = Message::user("hello");
        transcript.append(message.clone()).unwrap();
        let err = transcript.append(message).unwrap_err();
        assert!(err.is_duplicate_id());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn repeated_upserts_keep_one_message_with_last_content() {
        let mut transcript = Transcript::new();
        let id = MessageId::from("reply");
        for text in ["S", "Su", "Sun", "Sunny"] {
            transcript.upsert(&id, Role::Assistant, text, now());
        }
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.get(&id).unwrap().content, "Sunny");
    }

    #[test]
    fn upsert_keeps_role_timestamp_and_reaction() {
        let mut transcript = Transcript::new();
        let id = MessageId::from("reply");
        let created = OffsetDateTime::UNIX_EPOCH;
        transcript.upsert(&id, Role::Assistant, "Rain", created);
        transcript.set_reaction(&id, Reaction::Up);
        transcript.upsert(&id, Role::User, "Rain later", now());

        let message = transcript.get(&id).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.timestamp, created);
        assert_eq!(message.reaction, Some(Reaction::Up));
        assert_eq!(message.content, "Rain later");
    }

    #[test]
    fn reaction_toggles() {
        let mut transcript = Transcript::new();
        let id = MessageId::from("reply");
        transcript.upsert(&id, Role::Assistant, "Cloudy", now());

        assert_eq!(transcript.set_reaction(&id, Reaction::Up), Some(Some(Reaction::Up)));
        assert_eq!(transcript.set_reaction(&id, Reaction::Up), Some(None));
        assert_eq!(transcript.get(&id).unwrap().reaction, None);

        transcript.set_reaction(&id, Reaction::Up);
        transcript.set_reaction(&id, Reaction::Down);
        assert_eq!(transcript.get(&id).unwrap().reaction, Some(Reaction::Down));
    }

    #[test]
    fn reaction_on_unknown_or_user_message_is_noop() {
        let mut transcript = Transcript::new();
        let user = Message::user("hi");
        let user_id = user.id.clone();
        transcript.append(user).unwrap();
        let before = transcript.clone();

        assert_eq!(transcript.set_reaction(&MessageId::from("nope"), Reaction::Up), None);
        assert_eq!(transcript.set_reaction(&user_id, Reaction::Down), None);
        assert_eq!(transcript, before);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("hi")).unwrap();
        transcript.clear();
        assert!(transcript.is_empty());
        transcript.clear();
        assert_eq!(transcript, Transcript::new());
    }
}
