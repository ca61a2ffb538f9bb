use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::config::CompletionConfig;
use crate::error::Error;
use crate::request::{ChatMessage, CompletionRequest};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a>
{   pub model: &'a str
  , pub messages: &'a [ChatMessage]
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChoiceMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Client =====

/// Client for any OpenAI-compatible `chat/completions` endpoint
/// (OpenAI itself, Mistral, local gateways)
#[derive(Debug, Clone)]
pub struct OpenAiClient
{   api_base: String
  , model: String
  , api_key: Option<String>
  , http_client: reqwest::Client
}

impl OpenAiClient
{   /// Create a client from completion settings
    pub fn new(
      config: &CompletionConfig
    , api_key: Option<String>
    ) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for model: {}", config.model);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Cannot build HTTP client: {}", e);
          Error::HttpError(e.to_string())
        })?;
        Ok(OpenAiClient::with_client(config, api_key, http_client))
    }

    /// Create a client around an existing reqwest client;
    /// `timeout_secs` is then up to the caller
    pub fn with_client(
      config: &CompletionConfig
    , api_key: Option<String>
    , http_client: reqwest::Client
    ) -> Self
    {   OpenAiClient
        {   api_base: config.api_base.trim_end_matches('/').to_string()
          , model: config.model.clone()
          , api_key
          , http_client
        }
    }

    pub fn model(&self) -> &str
    {   &self.model
    }

    pub fn set_api_key(&mut self, key: String)
    {   debug!("Setting API key");
        self.api_key = Some(key);
    }

    fn get_api_key(&self) -> Result<&str, Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("No API key for model: {}", self.model);
          Error::MissingApiKey(
            format!("{}:{}", self.api_base, self.model)
          )
        })
    }

    async fn handle_chat(
      &self
    , request: &CompletionRequest
    ) -> Result<String, Error>
    {   debug!(
          "Handling chat completion with {} messages",
          request.messages.len()
        );

        let api_key = self.get_api_key()?;

        let body = ChatCompletionRequest
        {   model: &self.model
          , messages: &request.messages
          , max_tokens: Some(request.max_tokens)
          , temperature: Some(request.temperature)
          , stream: Some(false)
        };

        trace!("Chat completion request: {:?}", body);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Chat completion response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Completion API error: {}", error_text);
            return Err(Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        let choice = chat_response.choices
          .into_iter()
          .next()
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })?;

        debug!(
          "Completion finished: {}",
          choice.finish_reason.as_deref().unwrap_or("unknown")
        );
        // Refusals and tool calls come back with a null content
        choice.message.content.ok_or_else(|| {
          error!("Completion choice has no text content");
          Error::ParseError(
            "completion choice has no text content".to_string()
          )
        })
    }
}

impl super::CompletionService for OpenAiClient
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<String, Error>
    {   self.handle_chat(request).await
    }
}
