// Public modules
pub mod agent_request;
pub mod agent_stream_event;
pub mod message;
pub mod message_id;
pub mod reaction;
pub mod role;
pub mod timestamp;

// Re-exports
pub use agent_request::{AgentMessage, AgentRequest};
pub use agent_stream_event::{AgentStreamEvent, TextDelta};
pub use message::Message;
pub use message_id::MessageId;
pub use reaction::Reaction;
pub use role::Role;
