use std::collections::HashMap;
use std::time::{Duration as StdDuration, Instant};

use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{DEFAULT_ORACLE_TIMEOUT_SECS, MAX_ORACLE_TIMEOUT_SECS};
use crate::error::{AiErrorCode, AppError, AppResult};
use crate::models::ai_types::{
    AiProviderMetadata, InsightOracle, OracleCompletion, OraclePrompt,
};
use crate::services::prompt_templates::temperature;
use crate::utils::redact::redact_sensitive_data;

const ENV_API_KEY: &str = "PULSE_ORACLE_API_KEY";
const ENV_BASE_URL: &str = "PULSE_ORACLE_BASE_URL";
const ENV_MODEL: &str = "PULSE_ORACLE_MODEL";
const ENV_TIMEOUT_SECS: &str = "PULSE_ORACLE_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROVIDER_ID: &str = "openai-compatible";

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    /// Upper bound for the whole external step, retries included.
    pub timeout: StdDuration,
    /// Delay before each attempt; its length is the attempt count.
    pub backoff: Vec<StdDuration>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: StdDuration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            backoff: default_backoff(),
        }
    }
}

fn default_backoff() -> Vec<StdDuration> {
    vec![
        StdDuration::from_secs(0),
        StdDuration::from_secs(1),
        StdDuration::from_secs(2),
        StdDuration::from_secs(4),
    ]
}

impl OracleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`OracleConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let api_base_url = lookup(ENV_BASE_URL)
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup(ENV_MODEL)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => secs.clamp(1, MAX_ORACLE_TIMEOUT_SECS),
                Err(err) => {
                    warn!(
                        target: "app::ai",
                        value = %raw,
                        error = %err,
                        "ignoring malformed oracle timeout"
                    );
                    DEFAULT_ORACLE_TIMEOUT_SECS
                }
            },
            None => DEFAULT_ORACLE_TIMEOUT_SECS,
        };

        Self {
            api_key,
            api_base_url,
            model,
            timeout: StdDuration::from_secs(timeout_secs),
            backoff: default_backoff(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn with_backoff(mut self, backoff: Vec<StdDuration>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `None` when no API key is configured.
    pub fn build_oracle(&self) -> AppResult<Option<HttpOracle>> {
        match &self.api_key {
            Some(api_key) => HttpOracle::try_new(self, api_key.clone()).map(Some),
            None => Ok(None),
        }
    }
}

/// OpenAI-compatible chat-completions client.
pub struct HttpOracle {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    backoff: Vec<StdDuration>,
}

impl HttpOracle {
    pub fn try_new(config: &OracleConfig, api_key: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build oracle HTTP client: {err}")))?;

        let base_url = config.api_base_url.trim_end_matches('/');
        let backoff = if config.backoff.is_empty() {
            vec![StdDuration::from_secs(0)]
        } else {
            config.backoff.clone()
        };

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{base_url}/v1/chat/completions"),
            model: config.model.clone(),
            backoff,
        })
    }

    fn build_request_body(&self, prompt: &OraclePrompt) -> JsonValue {
        let user_content = serde_json::to_string(&prompt.user).unwrap_or_else(|_| "{}".to_string());
        json!({
            "model": self.model,
            "temperature": temperature(prompt.kind),
            "top_p": 0.9,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": user_content }
            ]
        })
    }

    async fn invoke_chat(&self, prompt: &OraclePrompt) -> AppResult<OracleCompletion> {
        let correlation_id = Uuid::new_v4().to_string();
        let sanitized_payload = serde_json::to_string(&redact_sensitive_data(&prompt.user))
            .unwrap_or_else(|_| "\"<redacted>\"".to_string());
        let request_body = self.build_request_body(prompt);

        let mut last_error: Option<AppError> = None;
        let attempts = self.backoff.len();

        for (attempt, delay) in self.backoff.iter().enumerate() {
            if !delay.is_zero() {
                sleep(*delay).await;
            }

            debug!(
                target: "app::ai::oracle",
                operation = prompt.kind.as_str(),
                attempt = attempt + 1,
                correlation_id = %correlation_id,
                prompt_hash = %prompt.fingerprint,
                payload = %sanitized_payload,
                "invoking oracle"
            );

            let start = Instant::now();
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let error = match response {
                Ok(resp) if resp.status().is_success() => {
                    let latency_ms = start.elapsed().as_millis();
                    debug!(
                        target: "app::ai::oracle",
                        correlation_id = %correlation_id,
                        latency_ms,
                        content_length = ?resp.content_length(),
                        "oracle responded"
                    );

                    let body: JsonValue = resp.json().await.map_err(|err| {
                        AppError::ai_with_details(
                            AiErrorCode::InvalidResponse,
                            "failed to decode oracle response body",
                            Some(correlation_id.as_str()),
                            Some(json!({ "reason": err.to_string() })),
                        )
                    })?;
                    return self.completion_from_body(&body, latency_ms, &correlation_id, prompt);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let (error, retryable) = Self::map_http_error(status, &correlation_id);
                    warn!(
                        target: "app::ai::oracle",
                        correlation_id = %correlation_id,
                        status = status.as_u16(),
                        retryable,
                        "oracle returned non-success status"
                    );
                    if !retryable {
                        return Err(error);
                    }
                    error
                }
                Err(err) => {
                    let (error, retryable) = Self::error_from_reqwest(err, &correlation_id);
                    warn!(
                        target: "app::ai::oracle",
                        correlation_id = %correlation_id,
                        retryable,
                        "oracle request error"
                    );
                    if !retryable {
                        return Err(error);
                    }
                    error
                }
            };

            if attempt + 1 == attempts {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::ai_with_details(
                AiErrorCode::OracleUnavailable,
                "oracle request failed",
                Some(correlation_id.as_str()),
                None,
            )
        }))
    }

    fn completion_from_body(
        &self,
        body: &JsonValue,
        latency_ms: u128,
        correlation_id: &str,
        prompt: &OraclePrompt,
    ) -> AppResult<OracleCompletion> {
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                AppError::ai_with_details(
                    AiErrorCode::InvalidResponse,
                    "oracle response is missing message.content",
                    Some(correlation_id),
                    Some(json!({ "reason": "missing_message_content" })),
                )
            })?;

        let tokens_used = extract_tokens(body);
        Ok(OracleCompletion {
            content: content.to_string(),
            metadata: AiProviderMetadata {
                provider_id: Some(PROVIDER_ID.to_string()),
                model: Some(self.model.clone()),
                latency_ms: Some(latency_ms),
                tokens_used: if tokens_used.is_empty() {
                    None
                } else {
                    Some(tokens_used)
                },
                correlation_id: Some(correlation_id.to_string()),
                prompt_hash: Some(prompt.fingerprint.clone()),
                fallback_reason: None,
            },
        })
    }

    fn map_http_error(status: StatusCode, correlation_id: &str) -> (AppError, bool) {
        let (code, message, retryable) = match status {
            StatusCode::UNAUTHORIZED => (
                AiErrorCode::MissingApiKey,
                "oracle API key is invalid or unauthorized".to_string(),
                false,
            ),
            StatusCode::FORBIDDEN => (
                AiErrorCode::Forbidden,
                "oracle API key lacks permission".to_string(),
                false,
            ),
            StatusCode::TOO_MANY_REQUESTS => (
                AiErrorCode::RateLimited,
                "oracle rate limit reached".to_string(),
                true,
            ),
            status if status.is_server_error() => (
                AiErrorCode::OracleUnavailable,
                format!("oracle temporarily unavailable (status {})", status.as_u16()),
                true,
            ),
            StatusCode::BAD_REQUEST => (
                AiErrorCode::InvalidRequest,
                "oracle rejected the request format".to_string(),
                false,
            ),
            StatusCode::NOT_FOUND => (
                AiErrorCode::InvalidRequest,
                "oracle endpoint not found".to_string(),
                false,
            ),
            status => (
                AiErrorCode::Unknown,
                format!("oracle returned status {}", status.as_u16()),
                false,
            ),
        };

        (
            AppError::ai_with_details(code, message, Some(correlation_id), None),
            retryable,
        )
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> (AppError, bool) {
        if err.is_timeout() {
            (
                AppError::ai_with_details(
                    AiErrorCode::HttpTimeout,
                    "oracle request timed out",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if err.is_connect() {
            (
                AppError::ai_with_details(
                    AiErrorCode::OracleUnavailable,
                    "could not connect to the oracle",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if let Some(status) = err.status() {
            Self::map_http_error(status, correlation_id)
        } else {
            (
                AppError::ai_with_details(
                    AiErrorCode::Unknown,
                    format!("oracle request failed: {err}"),
                    Some(correlation_id),
                    None,
                ),
                false,
            )
        }
    }
}

fn extract_tokens(body: &JsonValue) -> HashMap<String, u64> {
    let mut tokens = HashMap::new();

    if let Some(usage) = body.get("usage") {
        for (source, target) in [
            ("prompt_tokens", "prompt"),
            ("completion_tokens", "completion"),
            ("total_tokens", "total"),
        ] {
            if let Some(value) = usage.get(source).and_then(|v| v.as_u64()) {
                tokens.insert(target.to_string(), value);
            }
        }
    }

    tokens
}

#[async_trait::async_trait]
impl InsightOracle for HttpOracle {
    async fn complete(&self, prompt: &OraclePrompt) -> AppResult<OracleCompletion> {
        self.invoke_chat(prompt).await
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }
}

pub mod testing {
    use super::*;

    /// Expose the status mapping for integration tests without widening the public API surface.
    pub fn map_http_error(status: StatusCode) -> (AppError, bool) {
        HttpOracle::map_http_error(status, "test-correlation-id")
    }

    /// An oracle pointed at `base_url` with a test key and the given retry schedule.
    pub fn oracle_for(
        base_url: &str,
        timeout: StdDuration,
        backoff: Vec<StdDuration>,
    ) -> AppResult<HttpOracle> {
        let config = OracleConfig {
            api_key: Some("test-key".to_string()),
            api_base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
            backoff,
        };
        HttpOracle::try_new(&config, "test-key".to_string())
    }
}
