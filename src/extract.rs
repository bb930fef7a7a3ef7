//! Quiz extraction: turn a loosely formatted completion into validated questions.
//!
//! The model is asked to emit blocks of the form
//!
//! ```text
//! **QUESTION 1:** ...
//! **OPTION A:** ...
//! **OPTION B:** ...
//! **OPTION C:** ...
//! **OPTION D:** ...
//! **ANS:** B
//! ```
//!
//! We scan for every marker first, then walk the marker sequence looking for the
//! exact order `QUESTION, A, B, C, D, ANS`. A field's text is whatever lies
//! between its marker and the next one, so a broken block can never swallow the
//! fields of the block that follows it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::{AnswerLetter, QuizOptions, QuizQuestion};

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\*\*\s*(?:(?P<question>QUESTION\s*\d+)|OPTION\s*(?P<option>[A-D])|(?P<ans>ANS))\s*:\s*\*\*")
    .expect("marker pattern is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
  Question,
  Option(AnswerLetter),
  Answer,
}

/// A marker occurrence and the text that follows it up to the next marker.
#[derive(Debug)]
struct Field<'a> {
  marker: Marker,
  text: &'a str,
}

fn scan_fields(text: &str) -> Vec<Field<'_>> {
  let hits: Vec<(Marker, usize, usize)> = MARKER_RE
    .captures_iter(text)
    .filter_map(|caps| {
      let whole = caps.get(0)?;
      let marker = if caps.name("question").is_some() {
        Marker::Question
      } else if let Some(m) = caps.name("option") {
        Marker::Option(AnswerLetter::from_char(m.as_str().chars().next()?)?)
      } else {
        Marker::Answer
      };
      Some((marker, whole.start(), whole.end()))
    })
    .collect();

  hits
    .iter()
    .enumerate()
    .map(|(i, &(marker, _, end))| {
      let stop = hits.get(i + 1).map(|&(_, start, _)| start).unwrap_or(text.len());
      Field { marker, text: &text[end..stop] }
    })
    .collect()
}

const BLOCK_ORDER: [Marker; 6] = [
  Marker::Question,
  Marker::Option(AnswerLetter::A),
  Marker::Option(AnswerLetter::B),
  Marker::Option(AnswerLetter::C),
  Marker::Option(AnswerLetter::D),
  Marker::Answer,
];

/// Ensure the question ends with exactly one `?`. `None` if nothing is left.
pub fn normalize_question(raw: &str) -> Option<String> {
  let core = raw.trim().trim_end_matches(|c: char| c == '?' || c.is_whitespace());
  if core.is_empty() { None } else { Some(format!("{core}?")) }
}

/// The answer is the first non-blank character, and must stand alone as a
/// letter: `B) Paris` is B, `Both` is rejected.
pub fn parse_answer(field: &str) -> Option<AnswerLetter> {
  let mut chars = field.trim_start().chars();
  let letter = AnswerLetter::from_char(chars.next()?)?;
  match chars.next() {
    Some(c) if c.is_alphanumeric() => None,
    _ => Some(letter),
  }
}

fn build_question(block: &[Field<'_>]) -> Option<QuizQuestion> {
  let question = normalize_question(block[0].text)?;
  let options = QuizOptions {
    a: block[1].text.trim().to_string(),
    b: block[2].text.trim().to_string(),
    c: block[3].text.trim().to_string(),
    d: block[4].text.trim().to_string(),
  };
  if !options.is_well_formed() {
    return None;
  }
  let correct_answer = parse_answer(block[5].text)?;
  Some(QuizQuestion { question, options, correct_answer })
}

/// Extract up to `max` valid questions in document order.
pub fn extract_questions(text: &str, max: usize) -> Vec<QuizQuestion> {
  let fields = scan_fields(text);
  let mut out = Vec::new();
  let mut i = 0;

  while i < fields.len() && out.len() < max {
    let window = fields.get(i..i + BLOCK_ORDER.len());
    let complete = window
      .map(|w| w.iter().zip(BLOCK_ORDER.iter()).all(|(f, m)| f.marker == *m))
      .unwrap_or(false);

    match (complete, window) {
      (true, Some(block)) => {
        match build_question(block) {
          Some(q) => out.push(q),
          None => debug!(target: "quizgen", block_start = i, "Skipping block that failed validation"),
        }
        i += BLOCK_ORDER.len();
      }
      _ => {
        if fields[i].marker == Marker::Question {
          debug!(target: "quizgen", block_start = i, "Skipping incomplete or out-of-order block");
        }
        i += 1;
      }
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  const THREE_BLOCKS: &str = "\
**QUESTION 1:** What is the capital of France?
**OPTION A:** Paris
**OPTION B:** Rome
**OPTION C:** Berlin
**OPTION D:** Madrid
**ANS:** A

**QUESTION 2:** Which planet is known as the Red Planet?
**OPTION A:** Venus
**OPTION B:** Mars
**OPTION C:** Jupiter
**OPTION D:** Saturn
**ANS:** B

**QUESTION 3:** What is H2O commonly called?
**OPTION A:** Salt
**OPTION B:** Sugar
**OPTION C:** Water
**OPTION D:** Oxygen
**ANS:** C
";

  fn block(n: usize, q: &str, ans: &str) -> String {
    format!(
      "**QUESTION {n}:** {q}\n**OPTION A:** a{n}\n**OPTION B:** b{n}\n**OPTION C:** c{n}\n**OPTION D:** d{n}\n**ANS:** {ans}\n\n"
    )
  }

  #[test]
  fn extracts_well_formed_blocks_in_order() {
    let qs = extract_questions(THREE_BLOCKS, 3);
    assert_eq!(qs.len(), 3);
    assert_eq!(qs[0].question, "What is the capital of France?");
    assert_eq!(qs[0].options.a, "Paris");
    assert_eq!(qs[0].options.d, "Madrid");
    assert_eq!(qs[0].correct_answer, AnswerLetter::A);
    assert_eq!(qs[1].correct_answer, AnswerLetter::B);
    assert_eq!(qs[2].question, "What is H2O commonly called?");
    assert_eq!(qs[2].options.get(qs[2].correct_answer), "Water");
  }

  #[test]
  fn truncates_to_the_first_max_blocks() {
    let text: String = (1..=8).map(|n| block(n, &format!("Question number {n}?"), "D")).collect();
    let qs = extract_questions(&text, 4);
    assert_eq!(qs.len(), 4);
    let got: Vec<&str> = qs.iter().map(|q| q.question.as_str()).collect();
    assert_eq!(got, vec!["Question number 1?", "Question number 2?", "Question number 3?", "Question number 4?"]);
  }

  #[test]
  fn collapses_repeated_question_marks() {
    let qs = extract_questions(&block(1, "What is X??", "A"), 3);
    assert_eq!(qs[0].question, "What is X?");
    let qs = extract_questions(&block(1, "Name the largest ocean", "A"), 3);
    assert_eq!(qs[0].question, "Name the largest ocean?");
  }

  #[test]
  fn markers_and_answer_are_case_insensitive() {
    let text = "**question 1:** Is this lowercase?\n**option a:** yes\n**Option B:** no\n**OPTION c:** maybe\n**option D:** unsure\n**ans:** b";
    let qs = extract_questions(text, 3);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].correct_answer, AnswerLetter::B);
    assert_eq!(qs[0].options.b, "no");
  }

  #[test]
  fn tolerates_spacing_inside_markers_and_multiline_fields() {
    let text = "**QUESTION1:**\n   Which of these\n   is a prime?  \n**OPTION  A:**   4\n**OPTION B:** 6\n**OPTION C:**\n7\n**OPTION D:** 9\n**ANS:**\n  C";
    let qs = extract_questions(text, 3);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].question, "Which of these\n   is a prime?");
    assert_eq!(qs[0].options.c, "7");
    assert_eq!(qs[0].correct_answer, AnswerLetter::C);
  }

  #[test]
  fn incomplete_block_does_not_swallow_the_next_one() {
    // Block 1 has no ANS marker; block 2 is complete.
    let text = "**QUESTION 1:** Broken?\n**OPTION A:** a\n**OPTION B:** b\n**OPTION C:** c\n**OPTION D:** d\n\n".to_string()
      + &block(2, "Intact?", "B");
    let qs = extract_questions(&text, 3);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].question, "Intact?");
    assert_eq!(qs[0].options.d, "d2");
  }

  #[test]
  fn out_of_order_options_produce_no_record() {
    let text = "**QUESTION 1:** Swapped?\n**OPTION B:** b\n**OPTION A:** a\n**OPTION C:** c\n**OPTION D:** d\n**ANS:** A";
    assert!(extract_questions(text, 3).is_empty());
  }

  #[test]
  fn answer_outside_a_to_d_is_skipped() {
    let text = block(1, "Bad answer?", "E") + &block(2, "Word answer?", "Both") + &block(3, "Good?", "d) d3");
    let qs = extract_questions(&text, 3);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].question, "Good?");
    assert_eq!(qs[0].correct_answer, AnswerLetter::D);
  }

  #[test]
  fn duplicate_or_blank_options_are_skipped() {
    let dup = "**QUESTION 1:** Dup?\n**OPTION A:** same\n**OPTION B:** Same\n**OPTION C:** c\n**OPTION D:** d\n**ANS:** A\n";
    let blank = "**QUESTION 2:** Blank?\n**OPTION A:**\n**OPTION B:** b\n**OPTION C:** c\n**OPTION D:** d\n**ANS:** A\n";
    assert!(extract_questions(&format!("{dup}{blank}"), 3).is_empty());
  }

  #[test]
  fn prose_without_markers_yields_nothing() {
    let text = "Sure! Here is a quiz about volcanoes.\n1. What is magma?\nA) Rock B) Water";
    assert!(extract_questions(text, 3).is_empty());
  }

  #[test]
  fn question_of_only_question_marks_is_rejected() {
    assert_eq!(normalize_question("  ???  "), None);
    assert_eq!(normalize_question("Why ? ?"), Some("Why?".to_string()));
  }

  #[test]
  fn parse_answer_requires_a_standalone_letter() {
    assert_eq!(parse_answer(" a"), Some(AnswerLetter::A));
    assert_eq!(parse_answer("C."), Some(AnswerLetter::C));
    assert_eq!(parse_answer("B) Paris"), Some(AnswerLetter::B));
    assert_eq!(parse_answer("Both"), None);
    assert_eq!(parse_answer(""), None);
  }
}
