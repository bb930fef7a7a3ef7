//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.

use std::sync::Arc;
use axum::{extract::{rejection::QueryRejection, State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument, warn};

use crate::error::QuizError;
use crate::logic::{generate_quiz, MIN_TOPIC_CHARS};
use crate::protocol::*;
use crate::state::AppState;

/// Liveness probe.
#[instrument(level = "info")]
pub async fn http_test() -> impl IntoResponse { Json(TestOut { quiz: "test" }) }

/// Query pairs are taken raw so repeated keys resolve first-wins instead of
/// failing extraction with a plain-text rejection.
#[instrument(level = "info", skip_all)]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<QuizOut>, QuizError> {
  let q = match params {
    Ok(Query(pairs)) => QuizQuery::from_pairs(pairs),
    Err(rejection) => {
      warn!(target: "quizgen", error = %rejection, "Unreadable query string");
      return Err(QuizError::Validation { min_chars: MIN_TOPIC_CHARS });
    }
  };

  match generate_quiz(&state, q.topic.as_deref()).await {
    Ok(out) => {
      info!(target: "quizgen", topic = %out.topic, count = out.count, "HTTP quiz served");
      Ok(Json(out))
    }
    Err(e) => {
      warn!(target: "quizgen", status = e.status_code().as_u16(), error = %e, "HTTP quiz failed");
      Err(e)
    }
  }
}
