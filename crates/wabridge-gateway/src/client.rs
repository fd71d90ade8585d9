//! HTTP client for the gateway's `sendMessage` method.
//!
//! Builds the instance URL, posts the JSON payload, and categorises failures
//! into [`GatewayError`] variants. One attempt per call.

use std::{
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::{
    error::{GatewayError, Result},
    DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS,
};

/// Longest response body kept in a [`GatewayError::Rejected`].
const MAX_ERROR_BODY_SIZE: usize = 1024;

/// Configuration for the gateway client.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API, without a trailing slash.
    pub api_url: String,
    /// Gateway instance identifier.
    pub instance_id: String,
    /// Instance API token, sent as the last path segment.
    pub api_token: String,
    /// Timeout for a single request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl GatewayConfig {
    /// Creates a configuration for the public gateway host with default
    /// timeout.
    pub fn new(instance_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            instance_id: instance_id.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("wabridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Overrides the base URL, e.g. for a dedicated host or a mock server.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the full URL of a gateway method, including the token.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/waInstance{}/{method}/{}",
            self.api_url.trim_end_matches('/'),
            self.instance_id,
            self.api_token
        )
    }

    /// Returns the URL of a gateway method with the token masked for logging.
    pub fn method_url_masked(&self, method: &str) -> String {
        format!(
            "{}/waInstance{}/{method}/***",
            self.api_url.trim_end_matches('/'),
            self.instance_id
        )
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_url", &self.api_url)
            .field("instance_id", &self.instance_id)
            .field("api_token", &"***")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// JSON body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Destination chat identifier.
    pub chat_id: String,
    /// Message text.
    pub message: String,
}

/// Successful gateway response.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body, passed back to callers verbatim.
    pub body: serde_json::Value,
    /// Total duration of the request.
    pub duration: Duration,
}

impl GatewayResponse {
    /// Whether the gateway answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// HTTP client for the messaging gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Creates a new gateway client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| GatewayError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends a text message to a chat.
    ///
    /// # Errors
    ///
    /// - `Network` for connection failures
    /// - `Timeout` when the configured timeout elapses
    /// - `Rejected` for non-2xx responses whose body is not JSON
    /// - `InvalidResponse` when a 2xx body is not JSON
    ///
    /// A non-2xx response with a JSON body is returned as `Ok`; check
    /// [`GatewayResponse::is_success`].
    pub async fn send_message(&self, chat_id: &str, message: &str) -> Result<GatewayResponse> {
        let span = info_span!(
            "gateway_send_message",
            chat_id = %chat_id,
            url = %self.config.method_url_masked("sendMessage"),
        );

        async move {
            let start_time = Instant::now();
            let payload =
                SendMessageRequest { chat_id: chat_id.to_string(), message: message.to_string() };

            tracing::debug!("Sending message through gateway");

            let response = match self
                .client
                .post(self.config.method_url("sendMessage"))
                .json(&payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let duration = start_time.elapsed();
                    // reqwest errors carry the URL, which contains the token
                    let e = e.without_url();
                    tracing::warn!(duration_ms = duration.as_millis(), "Request failed: {}", e);

                    if e.is_timeout() {
                        return Err(GatewayError::timeout(self.config.timeout.as_secs()));
                    }
                    return Err(GatewayError::network(e.to_string()));
                },
            };

            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| GatewayError::network(e.without_url().to_string()))?;
            let duration = start_time.elapsed();

            tracing::debug!(
                status = status.as_u16(),
                duration_ms = duration.as_millis(),
                "Received response"
            );

            let parsed: serde_json::Result<serde_json::Value> = serde_json::from_slice(&bytes);

            if !status.is_success() {
                // a JSON error body is the gateway's answer and goes back to the caller
                return match parsed {
                    Ok(body) => {
                        tracing::warn!(status = status.as_u16(), "Gateway answered with an error");
                        Ok(GatewayResponse { status_code: status.as_u16(), body, duration })
                    },
                    Err(_) => {
                        tracing::warn!(status = status.as_u16(), "Gateway rejected message");
                        Err(GatewayError::rejected(status.as_u16(), truncate_body(&bytes)))
                    },
                };
            }

            let body = parsed.map_err(|e| {
                tracing::warn!(error = %e, "Gateway response is not JSON");
                GatewayError::invalid_response(e.to_string())
            })?;

            tracing::info!("Message accepted by gateway");
            Ok(GatewayResponse { status_code: status.as_u16(), body, duration })
        }
        .instrument(span)
        .await
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    if bytes.len() > MAX_ERROR_BODY_SIZE {
        let suffix = "... (truncated)";
        let truncated = String::from_utf8_lossy(&bytes[..MAX_ERROR_BODY_SIZE - suffix.len()]);
        format!("{truncated}{suffix}")
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
