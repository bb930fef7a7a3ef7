//! Application state: resolved quiz settings and the inference backend.
//!
//! Built once at startup and shared read-only across requests, so there is
//! nothing to lock.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{AppConfig, QuizSettings};
use crate::error::ConfigError;
use crate::inference::{CompletionBackend, HuggingFace};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub settings: QuizSettings,
}

impl AppState {
    /// Build state from config: construct the Hugging Face client with the token.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let hf = HuggingFace::from_config(cfg)?;
        info!(
            target: "quizgen",
            api_url = %hf.api_url,
            profile = ?cfg.quiz.profile,
            on_empty = ?cfg.quiz.on_empty,
            timeout = ?cfg.quiz.request_timeout,
            max_new_tokens = hf.params.max_new_tokens,
            "Inference backend configured."
        );
        Ok(Self::with_backend(Arc::new(hf), cfg.quiz.clone()))
    }

    pub fn with_backend(backend: Arc<dyn CompletionBackend>, settings: QuizSettings) -> Self {
        Self { backend, settings }
    }
}
