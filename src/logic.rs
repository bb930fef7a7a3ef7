//! Core request flow shared by the HTTP handlers:
//! validate topic -> build prompt -> fetch completion -> extract -> apply empty policy.

use tracing::{info, instrument, warn};

use crate::domain::{EmptyPolicy, QuizQuestion};
use crate::error::QuizError;
use crate::extract::extract_questions;
use crate::inference::{build_prompt, fetch_quiz_text};
use crate::protocol::QuizOut;
use crate::seeds::fallback_quiz;
use crate::state::AppState;

pub const MIN_TOPIC_CHARS: usize = 3;

/// Trimmed topic, or a validation error if it is missing or too short.
pub fn validate_topic(topic: Option<&str>) -> Result<&str, QuizError> {
  match topic.map(str::trim) {
    Some(t) if t.chars().count() >= MIN_TOPIC_CHARS => Ok(t),
    _ => Err(QuizError::Validation { min_chars: MIN_TOPIC_CHARS }),
  }
}

/// Zero questions is either an error carrying the raw text or the fallback quiz.
pub fn apply_empty_policy(
  questions: Vec<QuizQuestion>,
  policy: EmptyPolicy,
  raw: &str,
) -> Result<Vec<QuizQuestion>, QuizError> {
  if !questions.is_empty() {
    return Ok(questions);
  }
  match policy {
    EmptyPolicy::ReturnEmpty => Err(QuizError::ParseEmpty { raw: raw.to_string() }),
    EmptyPolicy::ReturnFallback => {
      warn!(target: "quizgen", "No valid questions extracted; serving fallback quiz");
      Ok(fallback_quiz())
    }
  }
}

#[instrument(level = "info", skip(state), fields(profile = ?state.settings.profile))]
pub async fn generate_quiz(state: &AppState, topic: Option<&str>) -> Result<QuizOut, QuizError> {
  let topic = validate_topic(topic)?;
  let settings = &state.settings;

  let prompt = build_prompt(&settings.prompt_template, topic, settings.profile.requested_questions());
  let quiz_text = fetch_quiz_text(state.backend.as_ref(), &prompt).await?;

  let extracted = extract_questions(&quiz_text, settings.profile.max_returned());
  info!(target: "quizgen", %topic, extracted = extracted.len(), "Quiz extraction finished");

  let questions = apply_empty_policy(extracted, settings.on_empty, &quiz_text)?;
  Ok(QuizOut { topic: topic.to_string(), count: questions.len(), questions })
}
