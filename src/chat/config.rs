//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved configuration the
//! binary runs with.

use arrrg_derive::CommandLine;

use crate::config::AgentConfig;
use crate::error::{Error, Result};

/// Page that opens shared conversations.
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:5173/";

/// Command-line arguments for the weather-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the agent deployment.
    #[arrrg(optional, "Agent deployment URL (default: $WEATHER_CHAT_BASE_URL or hosted)", "URL")]
    pub base_url: Option<String>,

    /// Agent identifier.
    #[arrrg(optional, "Agent id (default: weatherAgent)", "AGENT")]
    pub agent: Option<String>,

    /// Conversation thread identifier sent with every request.
    #[arrrg(optional, "Thread id (default: 2022200060)", "THREAD")]
    pub thread_id: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature 0.0-2.0 (default: 0.5)", "TEMP")]
    pub temperature: Option<String>,

    /// Origin used when building share links.
    #[arrrg(optional, "Origin for /share link (default: http://localhost:5173/)", "URL")]
    pub share_origin: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// How to reach the agent.
    pub agent: AgentConfig,

    /// Origin that share links point at.
    pub share_origin: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a ChatConfig for the default deployment, honoring `WEATHER_CHAT_BASE_URL`.
    pub fn new() -> Self {
        Self {
            agent: AgentConfig::from_env(),
            share_origin: DEFAULT_SHARE_ORIGIN.to_string(),
            use_color: true,
        }
    }

    /// Sets the agent configuration.
    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Sets the share origin.
    pub fn with_share_origin(mut self, origin: impl Into<String>) -> Self {
        self.share_origin = origin.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new();
        if let Some(url) = args.base_url {
            config.agent = config.agent.with_base_url(url);
        }
        if let Some(agent) = args.agent {
            config.agent = config
                .agent
                .with_agent_id(agent.clone())
                .with_run_id(agent.clone())
                .with_resource_id(agent);
        }
        if let Some(thread_id) = args.thread_id {
            config.agent = config.agent.with_thread_id(thread_id);
        }
        if let Some(temperature) = args.temperature {
            let value = temperature.trim().parse::<f32>().map_err(|_| {
                Error::validation(
                    format!("temperature {temperature:?} is not a number"),
                    Some("temperature".to_string()),
                )
            })?;
            config.agent = config.agent.with_temperature(value);
        }
        if let Some(origin) = args.share_origin {
            url::Url::parse(&origin)?;
            config.share_origin = origin;
        }
        config.use_color = !args.no_color;
        config.agent.validate()?;
        Ok(config)
    }
}
