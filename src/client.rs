use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde_json::Map;

use crate::accumulating_stream::{AccumulatingStream, StreamReply};
use crate::client_logger::ClientLogger;
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUESTS, CLIENT_REQUEST_ERRORS};
use crate::sse::process_sse;
use crate::types::{AgentMessage, AgentRequest, AgentStreamEvent, Role};

const FAILED_RESPONSE: &str = "Failed to get response from weather agent";
const NO_RESPONSE_BODY: &str = "No response body";

/// Client for the remote weather agent.
#[derive(Clone)]
pub struct WeatherAgent {
    client: ReqwestClient,
    config: AgentConfig,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl std::fmt::Debug for WeatherAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAgent")
            .field("config", &self.config)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl WeatherAgent {
    /// Create a client for the agent described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self {
            client,
            config,
            logger: None,
        })
    }

    /// Create a client for the default deployment, honoring `WEATHER_CHAT_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(AgentConfig::from_env())
    }

    /// Attach a logger that observes every stream event and finished reply.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Build the request body for a single prompt.
    pub fn request(&self, prompt: &str) -> AgentRequest {
        AgentRequest {
            messages: vec![AgentMessage {
                role: Role::User,
                content: prompt.to_string(),
            }],
            run_id: self.config.run_id.clone(),
            max_retries: self.config.max_retries,
            max_steps: self.config.max_steps,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            runtime_context: Map::new(),
            thread_id: self.config.thread_id.clone(),
            resource_id: self.config.resource_id.clone(),
        }
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-GB,en-US;q=0.9,en;q=0.8"),
        );
        if self.config.playground_header {
            headers.insert("x-mastra-dev-playground", HeaderValue::from_static("true"));
        }
        headers
    }

    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "weather agent rejected request");
        Error::api(status.as_u16(), FAILED_RESPONSE)
    }

    /// Send `prompt` and return the stream of decoded events.
    ///
    /// # Errors
    ///
    /// Fails with a transport error if the request cannot be sent, the status is not a
    /// success, or the response carries no body.
    pub async fn stream(
        &self,
        prompt: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<AgentStreamEvent>> + Send>>> {
        CLIENT_REQUESTS.click();
        let url = self.config.endpoint()?;
        let request = self.request(prompt);

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        self.config.timeout.map(|t| t.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Error::missing_body(NO_RESPONSE_BODY));
        }

        Ok(Box::pin(process_sse(response.bytes_stream())))
    }
}

#[async_trait::async_trait]
impl StreamReply for WeatherAgent {
    async fn stream_reply(
        &self,
        prompt: &str,
        on_update: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String> {
        let events = self.stream(prompt).await?;
        let reply = AccumulatingStream::new(events)
            .with_logger(self.logger.clone())
            .drain(on_update)
            .await?;
        if let Some(logger) = &self.logger {
            logger.log_reply(prompt, &reply);
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_creation() {
        let agent = WeatherAgent::new(AgentConfig::new()).unwrap();
        assert_eq!(agent.config(), &AgentConfig::new());

        let err = WeatherAgent::new(AgentConfig::new().with_agent_id("")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn request_carries_only_the_new_prompt() {
        let agent = WeatherAgent::new(AgentConfig::new()).unwrap();
        let request = agent.request("What's the weather in London?");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "messages": [{"role": "user", "content": "What's the weather in London?"}],
                "runId": "weatherAgent",
                "maxRetries": 2,
                "maxSteps": 5,
                "temperature": 0.5,
                "topP": 1.0,
                "runtimeContext": {},
                "threadId": "2022200060",
                "resourceId": "weatherAgent"
            })
        );
    }

    #[test]
    fn headers_follow_config() {
        let agent = WeatherAgent::new(AgentConfig::new()).unwrap();
        let headers = agent.default_headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-mastra-dev-playground"], "true");

        let agent =
            WeatherAgent::new(AgentConfig::new().with_playground_header(false)).unwrap();
        assert!(!agent.default_headers().contains_key("x-mastra-dev-playground"));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let config = AgentConfig::new().with_base_url("http://127.0.0.1:9");
        let agent = WeatherAgent::new(config).unwrap();
        let mut updates = 0;
        let err = agent
            .stream_reply("hello", &mut |_: &str| updates += 1)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(updates, 0);
    }
}
