//! Built-in content served when the model gives us nothing usable.

use crate::domain::{AnswerLetter, QuizOptions, QuizQuestion};

/// Absolute last-resort quiz, used only under the `return_fallback` policy.
pub fn fallback_quiz() -> Vec<QuizQuestion> {
  vec![QuizQuestion {
    question: "Who was the first US President?".into(),
    options: QuizOptions {
      a: "George Washington".into(),
      b: "Thomas Jefferson".into(),
      c: "Abraham Lincoln".into(),
      d: "John Adams".into(),
    },
    correct_answer: AnswerLetter::A,
  }]
}
