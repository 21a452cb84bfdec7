//! Quiz response parsing: turn raw model text into validated quiz items.
//!
//! Models asked for bare JSON still occasionally wrap the payload in
//! ` ```json ... ``` ` fences, so the parser strips one outer fence before
//! deserialising. Everything else is strict: the result is a tagged
//! [`ParsedQuizzes`] — either a non-empty list of structurally valid items
//! or `Malformed` with a reason. The caller maps `Malformed` (and outright
//! generation failure) to the single fixed placeholder quiz; no error
//! propagates.
//!
//! Validation rules, in order:
//! 1. parses as a JSON array of objects with all four fields
//! 2. the array is non-empty
//! 3. every item has exactly 4 options
//! 4. every item's `correct_answer` equals one of its options

use crate::corpus::Quiz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Outcome of parsing one quiz-generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuizzes {
    /// A non-empty list of structurally valid quiz items.
    Valid(Vec<Quiz>),
    /// The response could not be used; the reason is logged by the caller.
    Malformed(String),
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

/// Strip a single outer ```json fence, if present.
fn strip_json_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.trim().to_string()
    }
}

/// Parse and validate a raw quiz-generation response.
pub fn parse_quiz_response(raw: &str) -> ParsedQuizzes {
    let cleaned = strip_json_fences(raw);

    let quizzes: Vec<Quiz> = match serde_json::from_str(&cleaned) {
        Ok(quizzes) => quizzes,
        Err(e) => return ParsedQuizzes::Malformed(format!("not a JSON quiz array: {e}")),
    };

    if quizzes.is_empty() {
        return ParsedQuizzes::Malformed("empty quiz list".to_string());
    }

    for (i, quiz) in quizzes.iter().enumerate() {
        if quiz.options.len() != 4 {
            return ParsedQuizzes::Malformed(format!(
                "question {} has {} options, expected 4",
                i + 1,
                quiz.options.len()
            ));
        }
        if !quiz.options.contains(&quiz.correct_answer) {
            return ParsedQuizzes::Malformed(format!(
                "question {}: correct_answer is not one of the options",
                i + 1
            ));
        }
    }

    ParsedQuizzes::Valid(quizzes)
}
