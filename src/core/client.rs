//! HTTP client for OpenAI-compatible completion endpoints

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::{SummarizerConfig, SummaryApi};
use crate::core::errors::{PipelineError, Result, ServiceError};
use crate::core::models::{ApiKey, Completion};
use crate::core::summarizer::CompletionModel;

/// Build the shared HTTP client used by every external adapter
pub fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| PipelineError::Config {
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// Completion client for OpenAI and compatible providers
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: SummarizerConfig,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, config: SummarizerConfig) -> Self {
        let endpoint = config.endpoint();
        Self {
            client,
            config,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        match self.config.api {
            SummaryApi::Completions => serde_json::json!({
                "model": self.config.model,
                "prompt": prompt,
                "temperature": self.config.temperature,
                "max_tokens": self.config.max_tokens,
            }),
            SummaryApi::Chat => serde_json::json!({
                "model": self.config.model,
                "messages": [{
                    "role": "user",
                    "content": prompt,
                }],
                "temperature": self.config.temperature,
                "max_tokens": self.config.max_tokens,
            }),
        }
    }

    fn parse_completion(&self, json: &serde_json::Value) -> std::result::Result<Completion, ServiceError> {
        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| ServiceError::InvalidResponse {
                message: "No choices in response".to_string(),
            })?;

        let text = match self.config.api {
            SummaryApi::Completions => choice["text"].as_str(),
            SummaryApi::Chat => choice["message"]["content"].as_str(),
        }
        .ok_or_else(|| ServiceError::InvalidResponse {
            message: "No completion text in response".to_string(),
        })?;

        let tokens_used = json["usage"]["total_tokens"].as_u64().unwrap_or(0) as usize;

        Ok(Completion {
            text: text.trim().to_string(),
            tokens_used,
        })
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
        api_key: &ApiKey,
    ) -> std::result::Result<Completion, ServiceError> {
        debug!(
            "Requesting completion from {} ({} prompt chars)",
            self.config.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let json: serde_json::Value = response.json().await.map_err(|e| {
                ServiceError::InvalidResponse {
                    message: e.to_string(),
                }
            })?;
            return self.parse_completion(&json);
        }

        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let error_text = response.text().await.unwrap_or_default();
        let error_json: serde_json::Value =
            serde_json::from_str(&error_text).unwrap_or(serde_json::Value::Null);

        warn!("Completion request failed with status {}", status_code);

        if error_json["error"]["code"] == "insufficient_quota" {
            return Err(ServiceError::QuotaExceeded);
        }

        if status_code == 429 {
            return Err(ServiceError::RateLimited { retry_after });
        }

        let message = error_json["error"]["message"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or(error_text);

        Err(ServiceError::Api {
            status: status_code,
            message,
        })
    }
}
