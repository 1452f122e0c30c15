use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;
use crate::profile;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Error, Debug)]
pub enum BackendError {
  #[error("Failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("Error making HTTP request: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("Unexpected status code: {0}")]
  Status(StatusCode),

  #[error("Error decoding response: {0}")]
  Decode(#[source] serde_json::Error),

  #[error("Invalid or empty response from backend")]
  EmptyResponse
}

/// A text-generation backend: one prompt in, one completion out.
#[async_trait]
pub trait Backend: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  model:       &'a str,
  prompt:      &'a str,
  temperature: f64,
  system:      &'a str,
  stream:      bool,
  num_ctx:     usize
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  response: Option<String>
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
  client:         Client,
  endpoint:       String,
  model:          String,
  system:         String,
  temperature:    f64,
  context_length: usize
}

impl OllamaClient {
  pub fn new(settings: &Settings) -> Result<Self, BackendError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout))
      .build()
      .map_err(BackendError::Client)?;

    Ok(Self {
      client,
      endpoint: format!("{}{}", settings.base_url.trim_end_matches('/'), GENERATE_PATH),
      model: settings.model.clone(),
      system: settings.system_prompt.clone(),
      temperature: settings.temperature,
      context_length: settings.context_length
    })
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

#[async_trait]
impl Backend for OllamaClient {
  async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
    profile!("Ollama request");

    let request = GenerateRequest {
      model:       &self.model,
      prompt,
      temperature: self.temperature,
      system:      &self.system,
      stream:      false,
      num_ctx:     self.context_length
    };

    log::debug!("POST {} ({} prompt bytes)", self.endpoint, prompt.len());

    let response = self
      .client
      .post(&self.endpoint)
      .json(&request)
      .send()
      .await
      .map_err(BackendError::Transport)?;

    let status = response.status();
    if status != StatusCode::OK {
      return Err(BackendError::Status(status));
    }

    let body = response.text().await.map_err(BackendError::Transport)?;
    let parsed: GenerateResponse = serde_json::from_str(&body).map_err(BackendError::Decode)?;

    match parsed.response {
      Some(text) if !text.is_empty() => Ok(text),
      _ => Err(BackendError::EmptyResponse)
    }
  }
}
