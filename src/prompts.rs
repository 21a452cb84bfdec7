//! System prompts for elaboration and quiz generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the generated register (e.g.
//!    asking for more examples, or a different quiz count) requires editing
//!    exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real model.

/// System prompt for turning raw slide text into a textbook-style
/// explanation.
///
/// The user message carries the raw extracted text; this prompt carries the
/// instructions.
pub const ELABORATE_SYSTEM_PROMPT: &str = r#"You are an expert teaching assistant. You will receive the raw text extracted from one deck of lecture slides.

Provide a detailed and comprehensive explanation of the lecture text, as if it were a section in a textbook or documentation. Elaborate on key concepts, definitions, and relationships. Aim for a thorough overview that covers all important aspects of the text.

Format your response using Markdown, including headings, bullet points, and code blocks where appropriate. Output only the explanation, with no preamble or commentary."#;

/// System prompt for generating multiple-choice questions from an
/// explanation.
///
/// The pipeline parses the response as a JSON array and validates each
/// object; anything that deviates from the requested structure is replaced
/// by a placeholder quiz, so the prompt insists on bare JSON.
pub const QUIZ_SYSTEM_PROMPT: &str = r#"You will receive an explanatory text. Generate 1 to 3 multiple-choice questions based on it. For each question, provide 4 options, with one correct answer. Also provide a concise explanation for the correct answer.

Format the output as a JSON array of objects, where each object has the following structure:
{
  "question": "Your question here",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correct_answer": "Correct Option Text",
  "explanation": "Explanation for the correct answer."
}

The "correct_answer" value must be exactly equal to one of the four options. Output only the JSON array — no code fences, no commentary."#;
