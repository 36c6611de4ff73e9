//! Terminal front end for the weather agent.
//!
//! The binary reads snapshots from a [`Conversation`](crate::Conversation) and turns slash
//! commands into its intents. It supports:
//!
//! - Streaming replies printed as they grow
//! - Reactions on numbered replies
//! - Sharing the conversation as text or as a link
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing
//! - [`logging`]: stderr log output

mod commands;
mod config;
mod logging;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, ShareFormat, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_SHARE_ORIGIN};
pub use logging::{DEFAULT_LOG_FILTER, init_logging, log_filter};
