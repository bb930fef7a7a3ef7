//! Minimal Hugging Face Inference API client for quiz generation.
//!
//! One POST per quiz request, no retries. The client timeout bounds the call.
//! Calls are instrumented and log status, latency and response size (not contents).
//!
//! NOTE: We never log the API token.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::{AppConfig, GenerationParams};
use crate::error::{ConfigError, FetchError, QuizError};
use crate::util::{fill_template, trunc_for_log};

/// Upstream error bodies are cut to this many chars before they reach messages.
const ERROR_BODY_CHARS: usize = 300;

static FIRST_QUESTION_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\*\*\s*QUESTION\s*1\s*:\s*\*\*").expect("first-question pattern is valid")
});

/// Anything that can turn a prompt into raw completion text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HuggingFace {
  pub client: reqwest::Client,
  api_token: String,
  pub api_url: String,
  pub params: GenerationParams,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
  inputs: &'a str,
  parameters: &'a GenerationParams,
}

impl HuggingFace {
  pub fn new(
    api_url: impl Into<String>,
    api_token: impl Into<String>,
    params: GenerationParams,
    timeout: Duration,
  ) -> Result<Self, ConfigError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, api_token: api_token.into(), api_url: api_url.into(), params })
  }

  pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
    Self::new(
      cfg.api_url.clone(),
      cfg.api_token.clone(),
      cfg.quiz.generation.clone(),
      cfg.quiz.request_timeout,
    )
  }
}

#[async_trait]
impl CompletionBackend for HuggingFace {
  #[instrument(level = "info", skip(self, prompt), fields(url = %self.api_url, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, FetchError> {
    let req = InferenceRequest { inputs: prompt, parameters: &self.params };
    let start = Instant::now();

    let res = self.client.post(&self.api_url)
      .header(USER_AGENT, "quizgen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
      .json(&req)
      .send()
      .await
      .map_err(|e| {
        error!(elapsed = ?start.elapsed(), error = %e, "Inference request failed");
        FetchError::from(e)
      })?;

    let status = res.status();
    let body = res.text().await?;
    let elapsed = start.elapsed();

    if status != reqwest::StatusCode::OK {
      warn!(status = status.as_u16(), ?elapsed, body = %trunc_for_log(&body, 200), "Inference API returned non-200");
      return Err(FetchError::Status {
        status: status.as_u16(),
        body: trunc_for_log(&body, ERROR_BODY_CHARS),
      });
    }

    info!(status = status.as_u16(), ?elapsed, response_bytes = body.len(), "Inference response received");
    decode_completion(&body)
  }
}

/// Accepts `[{"generated_text": ...}, ...]`, `{"generated_text": ...}`, a JSON
/// string, or a plain text body.
pub fn decode_completion(body: &str) -> Result<String, FetchError> {
  let value = match serde_json::from_str::<Value>(body) {
    Ok(v) => v,
    Err(_) => return Ok(body.to_string()),
  };

  let generated = |v: &Value| v.get("generated_text").and_then(Value::as_str).map(str::to_string);

  match value {
    Value::Array(items) => {
      let first = items
        .first()
        .ok_or_else(|| FetchError::Envelope("empty result array".into()))?;
      generated(first).ok_or_else(|| FetchError::Envelope("first element has no generated_text".into()))
    }
    Value::Object(_) => {
      generated(&value).ok_or_else(|| FetchError::Envelope("object has no generated_text".into()))
    }
    Value::String(s) => Ok(s),
    other => Err(FetchError::Envelope(format!("unexpected JSON value: {}", trunc_for_log(&other.to_string(), 80)))),
  }
}

/// Fill the instruction template for `topic`, asking for `count` questions.
pub fn build_prompt(template: &str, topic: &str, count: usize) -> String {
  fill_template(template, &[("topic", topic), ("count", &count.to_string())])
}

/// Slice the completion from the first `**QUESTION 1:**` marker onward.
pub fn locate_quiz(text: &str) -> Option<&str> {
  FIRST_QUESTION_RE.find(text).map(|m| &text[m.start()..])
}

/// Generate, drop any echoed prompt, and require the first-question marker.
#[instrument(level = "info", skip(backend, prompt), fields(prompt_len = prompt.len()))]
pub async fn fetch_quiz_text(backend: &dyn CompletionBackend, prompt: &str) -> Result<String, QuizError> {
  let raw = backend.generate(prompt).await?;
  let completion = raw.strip_prefix(prompt).unwrap_or(&raw);

  match locate_quiz(completion) {
    Some(quiz) => Ok(quiz.to_string()),
    None => {
      warn!(completion_len = completion.len(), "Quiz format not detected in completion");
      Err(QuizError::Format { raw: completion.to_string() })
    }
  }
}
