//! Public protocol structs for the HTTP endpoints (serde ready).

use serde::Serialize;

use crate::domain::QuizQuestion;

#[derive(Debug)]
pub struct QuizQuery {
    pub topic: Option<String>,
}

impl QuizQuery {
    /// First `topic` wins when the key is repeated; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let topic = pairs.into_iter().find(|(k, _)| k == "topic").map(|(_, v)| v);
        Self { topic }
    }
}

/// Success body of `GET /getQuiz`.
#[derive(Debug, Serialize)]
pub struct QuizOut {
    pub topic: String,
    pub count: usize,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Serialize)]
pub struct TestOut {
    pub quiz: &'static str,
}
