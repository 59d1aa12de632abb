//! Question bank parser.
//!
//! Loads question banks from JSON or TOML files and directories, and validates
//! them.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ExamError;
use crate::model::{Question, QuestionKind};

/// On-disk format of a question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for BankFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(BankFormat::Json),
            "toml" => Ok(BankFormat::Toml),
            other => Err(format!("unsupported bank format: {other}")),
        }
    }
}

/// A bank wrapped in a table, `{ "questions": [...] }` or `[[questions]]`.
#[derive(Debug, Deserialize)]
struct WrappedBank {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Whether `content` is an HTML page, typically an error page served where a
/// question file was expected.
pub fn looks_like_html(content: &str) -> bool {
    let head: String = content.trim_start().chars().take(9).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Parse a question bank file. The format follows the file extension.
pub fn parse_bank(path: &Path) -> Result<Vec<Question>> {
    let format = BankFormat::from_path(path).with_context(|| {
        format!(
            "unsupported question bank extension (expected .json or .toml): {}",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, format, &path.display().to_string())
}

/// Parse question bank text. `source` names the origin in error messages.
///
/// An empty bank is an [`ExamError::EmptyQuestionBank`], reachable through
/// `downcast_ref`.
pub fn parse_bank_str(content: &str, format: BankFormat, source: &str) -> Result<Vec<Question>> {
    if looks_like_html(content) {
        anyhow::bail!(
            "received HTML instead of JSON from {source}; check that the question file exists"
        );
    }

    let questions = match format {
        BankFormat::Json if content.trim_start().starts_with('[') => {
            serde_json::from_str::<Vec<Question>>(content)
                .with_context(|| format!("failed to parse JSON: {source}"))?
        }
        BankFormat::Json => {
            serde_json::from_str::<WrappedBank>(content)
                .with_context(|| format!("failed to parse JSON: {source}"))?
                .questions
        }
        BankFormat::Toml => {
            toml::from_str::<WrappedBank>(content)
                .with_context(|| format!("failed to parse TOML: {source}"))?
                .questions
        }
    };

    if questions.is_empty() {
        return Err(anyhow::Error::new(ExamError::EmptyQuestionBank))
            .with_context(|| format!("no questions in {source}"));
    }

    tracing::debug!(count = questions.len(), source, "parsed question bank");
    Ok(questions)
}

/// Recursively load every `.json` / `.toml` bank under `dir` into one list.
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<Question>> {
    let mut questions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            questions.extend(load_bank_directory(&path)?);
        } else if BankFormat::from_path(&path).is_some() {
            match parse_bank(&path) {
                Ok(bank) => questions.extend(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(questions)
}

/// Load a bank from a file or a directory of banks.
pub fn load_bank(path: &Path) -> Result<Vec<Question>> {
    if path.is_dir() {
        let questions = load_bank_directory(path)?;
        if questions.is_empty() {
            return Err(anyhow::Error::new(ExamError::EmptyQuestionBank))
                .with_context(|| format!("no question banks found in {}", path.display()));
        }
        Ok(questions)
    } else {
        parse_bank(path)
    }
}

/// A warning from question bank validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 0-based index in the bank.
    pub index: usize,
    /// The question's id, if it has one.
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(index: usize, question: &Question, message: impl Into<String>) -> Self {
        Self {
            index,
            question_id: question.id.clone(),
            message: message.into(),
        }
    }

    /// `id` if present, else `#<1-based index>`.
    pub fn label(&self) -> String {
        match &self.question_id {
            Some(id) => id.clone(),
            None => format!("#{}", self.index + 1),
        }
    }
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_bank(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for (index, q) in questions.iter().enumerate() {
        if let Some(id) = &q.id {
            if !seen_ids.insert(id) {
                warnings.push(ValidationWarning::new(
                    index,
                    q,
                    format!("duplicate question ID: {id}"),
                ));
            }
        }
    }

    for (index, q) in questions.iter().enumerate() {
        let mut warn = |message: String| warnings.push(ValidationWarning::new(index, q, message));

        if q.question.trim().is_empty() {
            warn("question text is empty".into());
        }

        let options = q.options.as_deref().unwrap_or_default();

        match q.kind {
            QuestionKind::Unknown => {
                warn("unknown question type; it can never be answered correctly".into());
            }
            QuestionKind::MultipleChoice if options.is_empty() => {
                warn("multiple-choice question has no options".into());
            }
            QuestionKind::MultipleChoice if !options.contains(&q.answer) => {
                warn(format!("answer '{}' is not one of the options", q.answer));
            }
            QuestionKind::TrueFalse => {
                let answer = q.answer.trim().to_lowercase();
                if answer != "true" && answer != "false" {
                    warn(format!("true-false answer should be True or False, got '{}'", q.answer));
                }
            }
            QuestionKind::FillIn | QuestionKind::CodeAnalysis if q.answer.trim().is_empty() => {
                warn("question has no expected answer".into());
            }
            QuestionKind::DragAndDrop if q.drop_zones.is_empty() => {
                warn("drag-and-drop question has no drop zones".into());
            }
            QuestionKind::DragAndDrop => {
                for (zone, dz) in q.drop_zones.iter().enumerate() {
                    if !q.draggable_items.contains(&dz.correct_item) {
                        warn(format!(
                            "zone {} expects '{}', which is not a draggable item",
                            zone + 1,
                            dz.correct_item
                        ));
                    }
                }
            }
            _ => {}
        }

        if q.options.is_some() && q.kind != QuestionKind::MultipleChoice {
            warn(format!(
                "question lists options but is typed {}; should it be multiple-choice?",
                q.kind
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_JSON: &str = r#"[
        {
            "id": 1,
            "type": "multiple-choice",
            "question": "Which keyword declares an immutable binding?",
            "options": ["let", "mut", "static"],
            "answer": "let",
            "topic": "Basics"
        },
        {
            "id": "2",
            "type": "true-false",
            "question": "Rust has a garbage collector.",
            "answer": false
        },
        {
            "type": "drag-and-drop",
            "question": "Match the trait to its purpose",
            "dropZones": [
                {"placeholder": "Clone explicitly", "correctItem": "Clone"},
                {"placeholder": "Format for users", "correctItem": "Display"}
            ],
            "draggableItems": ["Display", "Clone", "Debug"],
            "topic": "Traits"
        }
    ]"#;

    const SAMPLE_TOML: &str = r#"
[[questions]]
id = "own-1"
type = "fill-in"
question = "What moves when a String is assigned to another binding?"
answer = "ownership"
topic = "Ownership"

[[questions]]
type = "code-analysis"
question = "What does this print?"
code = "println!(\"{}\", 1 + 1);"
answer = 2
"#;

    #[test]
    fn parse_json_bank() {
        let bank = parse_bank_str(SAMPLE_JSON, BankFormat::Json, "test").unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank[0].id.as_deref(), Some("1"));
        assert_eq!(bank[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(bank[1].answer, "false");
        assert_eq!(bank[1].topic, "Uncategorized");
        assert_eq!(bank[2].drop_zones[1].correct_item, "Display");
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn parse_wrapped_json_bank() {
        let content = format!(r#"{{ "questions": {SAMPLE_JSON} }}"#);
        let bank = parse_bank_str(&content, BankFormat::Json, "test").unwrap();
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn parse_toml_bank() {
        let bank = parse_bank_str(SAMPLE_TOML, BankFormat::Toml, "test").unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank[0].kind, QuestionKind::FillIn);
        assert_eq!(bank[1].answer, "2");
        assert!(bank[1].code.is_some());
    }

    #[test]
    fn html_is_rejected() {
        let err = parse_bank_str(
            "\n<!DOCTYPE html><html><body>404</body></html>",
            BankFormat::Json,
            "remote",
        )
        .unwrap_err();
        assert!(err.to_string().contains("received HTML instead of JSON"));
        assert!(looks_like_html("<HTML>"));
        assert!(!looks_like_html("[]"));
    }

    #[test]
    fn empty_bank_is_exam_error() {
        let err = parse_bank_str("[]", BankFormat::Json, "empty").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExamError>(),
            Some(&ExamError::EmptyQuestionBank)
        );
    }

    #[test]
    fn invalid_json_has_context() {
        let err = parse_bank_str("[{", BankFormat::Json, "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn parse_bank_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.toml");
        std::fs::write(&path, SAMPLE_TOML).unwrap();
        assert_eq!(parse_bank(&path).unwrap().len(), 2);

        let path = dir.path().join("bank.yaml");
        std::fs::write(&path, "questions: []").unwrap();
        assert!(parse_bank(&path).is_err());
    }

    #[test]
    fn load_directory_merges_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), SAMPLE_JSON).unwrap();
        let nested = dir.path().join("more");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("b.toml"), SAMPLE_TOML).unwrap();
        let mut bad = std::fs::File::create(dir.path().join("c.json")).unwrap();
        bad.write_all(b"not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bank = load_bank_directory(dir.path()).unwrap();
        assert_eq!(bank.len(), 5);
        assert_eq!(load_bank(dir.path()).unwrap().len(), 5);
    }

    #[test]
    fn load_directory_rejects_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(load_bank_directory(file.path()).is_err());
    }

    #[test]
    fn empty_directory_is_empty_bank() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bank(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<ExamError>().is_some());
    }

    #[test]
    fn validate_flags_authoring_mistakes() {
        let mut options_on_fill_in = Question::fill_in("Name it", "Rc").with_id("dup");
        options_on_fill_in.options = Some(vec!["Rc".into(), "Arc".into()]);

        let mut no_options = Question::multiple_choice("Pick", &[], "x");
        no_options.options = None;

        let bank = vec![
            Question::multiple_choice("Pick one", &["a", "b"], "c").with_id("dup"),
            options_on_fill_in,
            no_options,
            Question::true_false("Sure?", "yes"),
            Question::drag_and_drop("Match", &[("1", "Box")], &["Rc"]),
            Question::drag_and_drop("Nothing", &[], &[]),
            Question::fill_in("   ", "x"),
            Question::fill_in("No answer", ""),
        ];

        let warnings = validate_bank(&bank);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();

        assert!(messages.contains(&"duplicate question ID: dup"));
        assert!(messages.contains(&"answer 'c' is not one of the options"));
        assert!(messages
            .iter()
            .any(|m| m.contains("lists options but is typed fill-in")));
        assert!(messages.contains(&"multiple-choice question has no options"));
        assert!(messages.iter().any(|m| m.contains("got 'yes'")));
        assert!(messages
            .iter()
            .any(|m| m.contains("zone 1 expects 'Box'")));
        assert!(messages.contains(&"drag-and-drop question has no drop zones"));
        assert!(messages.contains(&"question text is empty"));
        assert!(messages.contains(&"question has no expected answer"));

        let dup = warnings
            .iter()
            .find(|w| w.message.starts_with("duplicate"))
            .unwrap();
        assert_eq!(dup.label(), "dup");
        assert_eq!(dup.index, 1);
        let unnamed = warnings
            .iter()
            .find(|w| w.message.contains("no drop zones"))
            .unwrap();
        assert_eq!(unnamed.label(), "#6");
    }

    #[test]
    fn options_on_true_false_are_flagged() {
        let mut listed = Question::true_false("Is it?", "Yes");
        listed.options = Some(vec!["Yes".into(), "No".into()]);
        let mut empty_list = Question::true_false("Or this?", "True");
        empty_list.options = Some(Vec::new());

        let warnings = validate_bank(&[listed, empty_list, Question::true_false("Plain", "False")]);
        let flagged: Vec<usize> = warnings
            .iter()
            .filter(|w| w.message.contains("lists options but is typed true-false"))
            .map(|w| w.index)
            .collect();
        assert_eq!(flagged, vec![0, 1]);
    }
}
