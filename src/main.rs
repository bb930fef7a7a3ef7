//! Quizgen · topic-to-quiz backend
//!
//! - Axum HTTP API (`GET /getQuiz?topic=...`, `GET /test`)
//! - Hugging Face Inference API for question generation
//! - Marker-based extraction of the completion into structured questions
//!
//! Important env variables:
//!   HF_API_TOKEN      : required; startup fails without it
//!   HF_API_URL        : default Mistral-7B-Instruct-v0.2 on api-inference.huggingface.co
//!   BIND_ADDR         : default "0.0.0.0"
//!   PORT              : u16 (default 5000)
//!   QUIZ_CONFIG_PATH  : path to TOML quiz settings (profile, policy, generation, prompt)
//!   QUIZ_PROFILE      : "standard" (3 asked / 3 returned) or "extended" (8 / 4)
//!   QUIZ_ON_EMPTY     : "return_empty" (500) or "return_fallback"
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod state;
mod protocol;
mod extract;
mod inference;
mod logic;
mod routes;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Configuration errors are the only fatal class.
  let cfg = AppConfig::from_env().map_err(|e| {
    error!(target: "quizgen", error = %e, "Invalid configuration; refusing to start");
    e
  })?;

  let state = Arc::new(AppState::from_config(&cfg)?);
  let app = build_router(state);

  let addr = cfg.bind_addr;
  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizgen", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "quizgen", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "quizgen", error = %e, "Failed to listen for shutdown signal");
  }
}
