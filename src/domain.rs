//! Domain models: answer letters, the lettered option set, quiz questions and profiles.

use serde::{Deserialize, Serialize};

/// One of the four option keys. Parsing is case-insensitive; serialized uppercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AnswerLetter {
  A,
  B,
  C,
  D,
}

impl AnswerLetter {
  /// `None` for anything outside a-d / A-D.
  pub fn from_char(c: char) -> Option<Self> {
    match c.to_ascii_uppercase() {
      'A' => Some(AnswerLetter::A),
      'B' => Some(AnswerLetter::B),
      'C' => Some(AnswerLetter::C),
      'D' => Some(AnswerLetter::D),
      _ => None,
    }
  }
}

/// Exactly four choices. Field order fixes the JSON key order A -> D.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizOptions {
  #[serde(rename = "A")] pub a: String,
  #[serde(rename = "B")] pub b: String,
  #[serde(rename = "C")] pub c: String,
  #[serde(rename = "D")] pub d: String,
}

impl QuizOptions {
  #[cfg(test)]
  pub fn get(&self, letter: AnswerLetter) -> &str {
    match letter {
      AnswerLetter::A => &self.a,
      AnswerLetter::B => &self.b,
      AnswerLetter::C => &self.c,
      AnswerLetter::D => &self.d,
    }
  }

  /// True if no option is blank and no two options are equal ignoring case.
  pub fn is_well_formed(&self) -> bool {
    let all = [&self.a, &self.b, &self.c, &self.d];
    if all.iter().any(|o| o.trim().is_empty()) { return false; }
    for i in 0..all.len() {
      for j in (i + 1)..all.len() {
        if all[i].trim().to_lowercase() == all[j].trim().to_lowercase() { return false; }
      }
    }
    true
  }
}

/// A single validated multiple-choice question as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
  pub question: String,
  pub options: QuizOptions,
  pub correct_answer: AnswerLetter,
}

/// Fixes how many questions we ask the model for and how many we hand back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizProfile {
  #[default]
  Standard,
  Extended,
}

impl QuizProfile {
  pub fn requested_questions(self) -> usize {
    match self {
      QuizProfile::Standard => 3,
      QuizProfile::Extended => 8,
    }
  }

  pub fn max_returned(self) -> usize {
    match self {
      QuizProfile::Standard => 3,
      QuizProfile::Extended => 4,
    }
  }

  pub fn default_max_new_tokens(self) -> u32 {
    match self {
      QuizProfile::Standard => 800,
      QuizProfile::Extended => 700,
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "standard" => Some(QuizProfile::Standard),
      "extended" => Some(QuizProfile::Extended),
      _ => None,
    }
  }
}

/// What to do when extraction yields no valid question at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
  /// Report the failure to the caller (500 with a debug excerpt).
  #[default]
  ReturnEmpty,
  /// Substitute the built-in fallback quiz.
  ReturnFallback,
}

impl EmptyPolicy {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "return_empty" => Some(EmptyPolicy::ReturnEmpty),
      "return_fallback" => Some(EmptyPolicy::ReturnFallback),
      _ => None,
    }
  }
}
