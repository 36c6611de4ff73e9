use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Role;

/// One conversational entry in the outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Author of the entry; always `user` for outbound turns.
    pub role: Role,
    /// The prompt text.
    pub content: String,
}

/// Body POSTed to the agent's stream endpoint for a single turn.
///
/// Only the new prompt travels with the request; continuity comes from the fixed
/// thread and resource identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    /// The turn's messages; exactly one user entry.
    pub messages: Vec<AgentMessage>,
    /// Run identifier.
    pub run_id: String,
    /// How often the agent may retry upstream model calls.
    pub max_retries: u32,
    /// How many tool/model steps the agent may take.
    pub max_steps: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
    /// Free-form runtime context, empty by default.
    #[serde(default)]
    pub runtime_context: Map<String, Value>,
    /// Server-side conversation thread.
    pub thread_id: String,
    /// Server-side resource the thread belongs to.
    pub resource_id: String,
}

impl AgentRequest {
    /// Returns the prompt carried by this request, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.messages.first().map(|m| m.content.as_str())
    }
}
