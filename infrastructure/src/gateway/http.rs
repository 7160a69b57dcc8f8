//! OpenAI-compatible chat completion gateway.
//!
//! Implements the [`ModelGateway`] port against a single HTTP endpoint
//! speaking the `/chat/completions` wire format. The endpoint is the
//! model-routing proxy, which handles provider routing and auth; this
//! adapter only translates messages and classifies failures.

use async_trait::async_trait;
use council_application::ports::model_gateway::{GatewayError, ModelGateway};
use council_domain::core::string::truncate;
use council_domain::{Message, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest upstream error body kept in a failure record.
const MAX_ERROR_BODY: usize = 2048;

/// HTTP adapter for the model gateway port.
pub struct HttpModelGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpModelGateway {
    /// Create a gateway against `base_url` (e.g. `http://localhost:8080/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_api_key(base_url, None)
    }

    /// Create a gateway that sends a bearer key with each request. The
    /// routing proxy usually authenticates via OAuth, so the key is
    /// optional.
    pub fn with_api_key(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn invoke(
        &self,
        model: &Model,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: model.as_str(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .timeout(timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("POST {} (model {})", self.completions_url(), model);
        let response = request.send().await.map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GatewayError::Malformed("completion has no content".to_string()))
    }
}

fn classify_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Unreachable(e.to_string())
    }
}
