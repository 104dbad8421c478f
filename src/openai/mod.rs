pub mod types;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use schemars::schema_for;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{upstream_error, AppResult, Error};
use crate::model::Reminder;
pub use types::*;

/// Name under which the response schema is declared
pub const RESPONSE_SCHEMA_NAME: &str = "response";

/// A chat model that can answer with schema-constrained output
#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    /// Run one completion and return the content of the first choice
    async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<String>;
}

/// JSON Schema of [`Reminder`], as sent to the model
pub fn response_schema() -> AppResult<Value> {
    let mut schema = serde_json::to_value(schema_for!(Reminder))?;
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    Ok(schema)
}

/// Response format binding the model output to [`Reminder`]
pub fn reminder_response_format() -> AppResult<ResponseFormat> {
    Ok(ResponseFormat::JsonSchema {
        json_schema: JsonSchemaFormat {
            name: RESPONSE_SCHEMA_NAME.to_string(),
            strict: true,
            schema: response_schema()?,
        },
    })
}

/// Chat Completions client backed by reqwest
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client; without a timeout a hung upstream call waits forever
    pub fn new(api_key: &str, base_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from the service configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        info!(
            "Using model API at {} (timeout: {:?})",
            config.openai_base_url,
            config.request_timeout()
        );
        Self::new(
            &config.openai_api_key,
            &config.openai_base_url,
            config.request_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<String> {
        debug!("Requesting completion from model {}", request.model);

        let res = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| upstream_error(&format!("Failed to parse completion response: {}", e)))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| upstream_error("Model returned no choices"))?;

        if let Some(refusal) = message.refusal {
            return Err(Error::Upstream(format!("Model refused the request: {}", refusal)));
        }

        debug!("Received completion from model {}", request.model);
        message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| upstream_error("Model returned an empty response"))
    }
}

/// Build the error for a non-success status, preferring the API's own message
fn status_error(status: StatusCode, body: &str) -> Error {
    let code = status.as_u16();
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_error) => Error::Upstream(format!("{} {}", code, api_error.error.message)),
        Err(_) if body.trim().is_empty() => {
            Error::Upstream(format!("{} status code (no body)", code))
        }
        Err(_) => Error::Upstream(format!("{} {}", code, body.trim())),
    }
}
