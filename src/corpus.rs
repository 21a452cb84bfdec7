//! The persisted course corpus.
//!
//! A [`Corpus`] is the single JSON artifact the pipeline builds up across
//! runs. Its shape is a contract with the downstream presentation layer and
//! must be preserved field-for-field:
//!
//! ```json
//! { "modules": [ { "name": "...", "pages": [ { "id": "...", "title": "...",
//!   "content": "...", "tests": [ { "question": "...", "options": [...],
//!   "correct_answer": "...", "explanation": "..." } ] } ] } ] }
//! ```
//!
//! Ownership is strictly tree-shaped: the corpus owns its modules, each
//! module its pages, each page its quizzes. Modules are append-only across
//! the corpus lifetime; pages are append-only within a module.

use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// One generated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    /// Exactly four options when produced by a valid generation.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl Quiz {
    /// The fixed generic quiz substituted whenever quiz generation fails or
    /// returns malformed data. Guarantees every sufficiently-long page has
    /// at least one quiz item.
    pub fn placeholder() -> Self {
        Self {
            question: "What is a key concept from this section?".to_string(),
            options: vec![
                "Option 1".to_string(),
                "Option 2".to_string(),
                "Option 3".to_string(),
                "Option 4".to_string(),
            ],
            correct_answer: "Option 1".to_string(),
            explanation: "This is a placeholder quiz because a specific one could not be generated."
                .to_string(),
        }
    }
}

/// One processed input file: explanation plus its quizzes.
///
/// `id` is the sole identity key for resume decisions. It is derived as
/// `<module_name>_<file_stem>` and therefore stable across runs for the same
/// input path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tests: Vec<Quiz>,
}

/// One top-level input subdirectory (course unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub name: String,
    pub pages: Vec<Page>,
}

/// The root persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub modules: Vec<CourseModule>,
}

impl Corpus {
    /// Load the corpus from `path`.
    ///
    /// A missing file yields an empty corpus. A file that exists but is not
    /// parseable JSON also yields an empty corpus, after a WARN — the
    /// practical effect is an implicit full reprocess, since no page ids are
    /// known.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No existing corpus at {}, starting empty", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(corpus) => {
                debug!("Loaded existing corpus from {}", path.display());
                corpus
            }
            Err(e) => {
                warn!(
                    "Could not decode existing corpus {}: {}. Starting with empty data.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Serialize the full corpus to `path` as pretty-printed UTF-8 JSON.
    ///
    /// Writes to a sibling temp file and renames it into place so the
    /// previous checkpoint survives a crash mid-write. This call is the sole
    /// durability checkpoint of the pipeline; it runs after every merged
    /// page.
    pub async fn save(&self, path: &Path) -> Result<(), IngestError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| IngestError::Internal(format!("corpus serialization: {e}")))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    IngestError::OutputWriteFailed {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| IngestError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| IngestError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Find the module named `name`, creating it at the end of the list if
    /// absent. Module records are never removed once created.
    pub fn module_mut(&mut self, name: &str) -> &mut CourseModule {
        let idx = match self.modules.iter().position(|m| m.name == name) {
            Some(idx) => idx,
            None => {
                self.modules.push(CourseModule {
                    name: name.to_string(),
                    pages: Vec::new(),
                });
                self.modules.len() - 1
            }
        };
        &mut self.modules[idx]
    }

    /// Every page id currently in the corpus, across all modules.
    pub fn processed_ids(&self) -> HashSet<String> {
        self.modules
            .iter()
            .flat_map(|m| m.pages.iter())
            .map(|p| p.id.clone())
            .collect()
    }

    /// Total page count across all modules.
    pub fn page_count(&self) -> usize {
        self.modules.iter().map(|m| m.pages.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page(id: &str) -> Page {
        Page {
            id: id.to_string(),
            title: id.replace('_', " "),
            content: "content".to_string(),
            tests: vec![Quiz::placeholder()],
        }
    }

    #[test]
    fn serde_shape_matches_contract() {
        let mut corpus = Corpus::default();
        corpus.module_mut("M1").pages.push(sample_page("M1_lec1"));

        let value = serde_json::to_value(&corpus).unwrap();
        let page = &value["modules"][0]["pages"][0];

        assert_eq!(value["modules"][0]["name"], "M1");
        assert_eq!(page["id"], "M1_lec1");
        assert_eq!(page["title"], "M1 lec1");
        assert_eq!(page["content"], "content");
        assert_eq!(page["tests"][0]["question"], Quiz::placeholder().question);
        assert_eq!(page["tests"][0]["options"].as_array().unwrap().len(), 4);
        assert_eq!(page["tests"][0]["correct_answer"], "Option 1");
        assert!(page["tests"][0]["explanation"].is_string());
    }

    #[test]
    fn module_mut_creates_once() {
        let mut corpus = Corpus::default();
        corpus.module_mut("M1").pages.push(sample_page("M1_a"));
        corpus.module_mut("M1").pages.push(sample_page("M1_b"));
        corpus.module_mut("M2");

        assert_eq!(corpus.modules.len(), 2);
        assert_eq!(corpus.modules[0].pages.len(), 2);
        assert_eq!(corpus.modules[1].name, "M2");
    }

    #[test]
    fn processed_ids_walks_all_modules() {
        let mut corpus = Corpus::default();
        corpus.module_mut("M1").pages.push(sample_page("M1_a"));
        corpus.module_mut("M2").pages.push(sample_page("M2_b"));

        let ids = corpus.processed_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("M1_a"));
        assert!(ids.contains("M2_b"));
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut corpus = Corpus::default();
        corpus.module_mut("M1").pages.push(sample_page("M1_lec1"));
        corpus.save(&path).await.unwrap();

        let loaded = Corpus::load(&path);
        assert_eq!(loaded, corpus);

        // Pretty-printed, not a single line.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.lines().count() > 1);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::load(&dir.path().join("nope.json"));
        assert!(corpus.modules.is_empty());
    }

    #[test]
    fn load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let corpus = Corpus::load(&path);
        assert!(corpus.modules.is_empty());
    }

    #[test]
    fn placeholder_quiz_is_fixed() {
        let a = Quiz::placeholder();
        let b = Quiz::placeholder();
        assert_eq!(a, b);
        assert_eq!(a.options.len(), 4);
        assert!(a.options.contains(&a.correct_answer));
    }
}
