//! Error taxonomy: startup configuration, outbound inference calls, and the
//! request boundary mapping to HTTP status + JSON body.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::util::excerpt;

/// Upper bound on raw completion text echoed back in error bodies.
pub const DEBUG_EXCERPT_CHARS: usize = 500;

/// Fatal at startup; the server never binds when one of these occurs.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("HF_API_TOKEN environment variable not set")]
  MissingToken,

  #[error("invalid value for {key}: {value:?}")]
  InvalidValue { key: &'static str, value: String },

  #[error("failed to read quiz config {path}: {source}")]
  Read { path: String, #[source] source: std::io::Error },

  #[error("failed to parse quiz config {path}: {source}")]
  Parse { path: String, #[source] source: toml::de::Error },

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

/// A failed outbound call to the inference endpoint. Never retried.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("inference API request failed: {status} - {body}")]
  Status { status: u16, body: String },

  #[error("unexpected inference API response format: {0}")]
  Envelope(String),

  #[error("inference API request timed out")]
  Timeout,

  #[error("inference API transport error: {0}")]
  Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() { FetchError::Timeout } else { FetchError::Transport(err) }
  }
}

/// Everything that can go wrong while serving a single `/getQuiz` request.
#[derive(Debug, Error)]
pub enum QuizError {
  #[error("Valid topic parameter required (min {min_chars} characters)")]
  Validation { min_chars: usize },

  #[error("Quiz generation failed")]
  Fetch(#[from] FetchError),

  #[error("Quiz format not detected in response")]
  Format { raw: String },

  #[error("Failed to generate valid quiz questions")]
  ParseEmpty { raw: String },
}

impl QuizError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      QuizError::Validation { .. } => StatusCode::BAD_REQUEST,
      QuizError::Fetch(_) | QuizError::Format { .. } | QuizError::ParseEmpty { .. } => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn body(&self) -> ErrorBody {
    let error = self.to_string();
    match self {
      QuizError::Validation { .. } => ErrorBody { error, message: None, debug: None },
      QuizError::Fetch(e) => ErrorBody { error, message: Some(e.to_string()), debug: None },
      QuizError::Format { raw } | QuizError::ParseEmpty { raw } => ErrorBody {
        error,
        message: None,
        debug: Some(excerpt(raw, DEBUG_EXCERPT_CHARS)),
      },
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debug: Option<String>,
}

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    (self.status_code(), Json(self.body())).into_response()
  }
}
