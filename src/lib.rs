//! Streaming chat client for a remote weather-answering agent.
//!
//! [`WeatherAgent`] sends one prompt per turn and folds the agent's `data:` event stream into a
//! growing reply. [`Conversation`] owns the [`Transcript`] and runs turns one at a time,
//! upserting the assistant message by id as its text grows.

// Public modules
pub mod accumulating_stream;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod config;
pub mod conversation;
pub mod error;
pub mod export;
pub mod observability;
pub mod render;
pub mod sse;
pub mod transcript;
pub mod types;

// Re-exports
pub use accumulating_stream::{AccumulatingStream, StreamReply};
pub use client::WeatherAgent;
pub use client_logger::ClientLogger;
pub use config::AgentConfig;
pub use conversation::{Conversation, ConversationSnapshot, SkipReason, TurnOutcome, TurnState};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use transcript::Transcript;
pub use types::*;
