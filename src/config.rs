//! Connection and generation settings for the remote weather agent.
//!
//! Every value here is held constant across turns.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default deployment of the weather agent.
pub const DEFAULT_BASE_URL: &str =
    "https://brief-thousands-sunset-9fcb1c78-485f-4967-ac042759a8fa1462.mastra.cloud/";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "WEATHER_CHAT_BASE_URL";

const DEFAULT_AGENT_ID: &str = "weatherAgent";
const DEFAULT_THREAD_ID: &str = "2022200060";
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_MAX_STEPS: u32 = 5;
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_TOP_P: f32 = 1.0;

/// Settings for [`WeatherAgent`](crate::WeatherAgent).
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Root URL of the agent server.
    pub base_url: String,

    /// Agent name in the endpoint path.
    pub agent_id: String,

    /// Run identifier sent with every request.
    pub run_id: String,

    /// Server-side conversation thread.
    pub thread_id: String,

    /// Server-side resource owning the thread.
    pub resource_id: String,

    /// Upstream retries the agent may perform.
    pub max_retries: u32,

    /// Agent steps allowed per turn.
    pub max_steps: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling parameter.
    pub top_p: f32,

    /// Deadline for the whole request, reply body included. `None` leaves a live stream
    /// running for as long as the agent keeps it open.
    pub timeout: Option<Duration>,

    /// Send the playground header the hosted deployment expects.
    pub playground_header: bool,
}

impl AgentConfig {
    /// Creates a configuration pointing at the default deployment.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            run_id: DEFAULT_AGENT_ID.to_string(),
            thread_id: DEFAULT_THREAD_ID.to_string(),
            resource_id: DEFAULT_AGENT_ID.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_steps: DEFAULT_MAX_STEPS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            timeout: None,
            playground_header: true,
        }
    }

    /// Creates the default configuration, taking the base URL from `WEATHER_CHAT_BASE_URL`
    /// when it is set.
    pub fn from_env() -> Self {
        match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new().with_base_url(url.trim()),
            _ => Self::new(),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the agent id.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Sets the run id.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Sets the thread id.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }

    /// Sets the resource id.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    /// Sets the retry limit.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the step limit.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets a deadline for the whole request, reply body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables the playground header.
    pub fn with_playground_header(mut self, enabled: bool) -> Self {
        self.playground_header = enabled;
        self
    }

    /// The streaming endpoint, `{base_url}/api/agents/{agent_id}/stream`.
    pub fn endpoint(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(&format!("api/agents/{}/stream", self.agent_id))?)
    }

    /// Checks that the configuration can produce a valid request.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("agent_id", &self.agent_id),
            ("run_id", &self.run_id),
            ("thread_id", &self.thread_id),
            ("resource_id", &self.resource_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(
                    format!("{name} must not be empty"),
                    Some(name.to_string()),
                ));
            }
        }
        if self.agent_id.contains('/') {
            return Err(Error::validation(
                "agent_id must be a single path segment",
                Some("agent_id".to_string()),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::validation(
                format!("temperature {} is outside 0.0..=2.0", self.temperature),
                Some("temperature".to_string()),
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(Error::validation(
                format!("top_p {} is outside 0.0..=1.0", self.top_p),
                Some("top_p".to_string()),
            ));
        }
        self.endpoint()?;
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AgentConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.agent_id, "weatherAgent");
        assert_eq!(config.run_id, "weatherAgent");
        assert_eq!(config.resource_id, "weatherAgent");
        assert_eq!(config.thread_id, "2022200060");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.top_p, 1.0);
        assert!(config.playground_header);
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_joins_path() {
        let config = AgentConfig::new().with_base_url("http://127.0.0.1:4111");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://127.0.0.1:4111/api/agents/weatherAgent/stream"
        );

        let config = AgentConfig::new()
            .with_base_url("http://localhost:4111/proxy")
            .with_agent_id("forecaster");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://localhost:4111/proxy/api/agents/forecaster/stream"
        );
    }

    #[test]
    fn builder_pattern() {
        let config = AgentConfig::new()
            .with_run_id("run")
            .with_thread_id("thread")
            .with_resource_id("resource")
            .with_max_retries(0)
            .with_max_steps(1)
            .with_temperature(0.9)
            .with_top_p(0.8)
            .with_timeout(Duration::from_secs(5))
            .with_playground_header(false);
        assert_eq!(config.run_id, "run");
        assert_eq!(config.thread_id, "thread");
        assert_eq!(config.resource_id, "resource");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.max_steps, 1);
        assert_eq!(config.temperature, 0.9);
        assert_eq!(config.top_p, 0.8);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert!(!config.playground_header);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let err = AgentConfig::new().with_thread_id("  ").validate().unwrap_err();
        assert!(matches!(err, Error::Validation { param: Some(ref p), .. } if p == "thread_id"));

        assert!(AgentConfig::new().with_temperature(3.0).validate().is_err());
        assert!(AgentConfig::new().with_top_p(-0.1).validate().is_err());
        assert!(AgentConfig::new().with_agent_id("a/b").validate().is_err());

        let err = AgentConfig::new().with_base_url("not a url").validate().unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }
}
