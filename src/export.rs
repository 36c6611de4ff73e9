//! Sharing a conversation as plain text or as a link.
//!
//! Both forms are pure functions of a transcript snapshot.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::Result;
use crate::types::Message;

/// Heading of a shared plain-text transcript.
pub const SHARE_TITLE: &str = "Weather Chat Conversation";

/// Query parameter that carries an encoded transcript.
pub const SHARE_PARAM: &str = "chat";

const RULE_WIDTH: usize = 30;

/// Render `messages` as a human-readable transcript.
///
/// ```
/// # use weather_chat::{Message, export::share_text};
/// let text = share_text(&[Message::user("Is it raining?")]);
/// assert!(text.ends_with("You: Is it raining?"));
/// ```
pub fn share_text(messages: &[Message]) -> String {
    let body = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.speaker(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{SHARE_TITLE}\n{}\n\n{body}", "=".repeat(RULE_WIDTH))
}

/// Encode `messages` as base64 JSON.
pub fn encode_messages(messages: &[Message]) -> Result<String> {
    let json = serde_json::to_vec(messages)?;
    Ok(STANDARD.encode(json))
}

/// Build a link to `origin` carrying the encoded transcript in the `chat` query parameter.
pub fn share_link(origin: &str, messages: &[Message]) -> Result<Url> {
    let mut url = Url::parse(origin)?;
    let encoded = encode_messages(messages)?;
    url.query_pairs_mut().append_pair(SHARE_PARAM, &encoded);
    Ok(url)
}
