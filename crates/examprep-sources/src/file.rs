//! Local file and directory source.

use std::path::PathBuf;

use async_trait::async_trait;

use examprep_core::model::Question;
use examprep_core::parser::load_bank;

use crate::error::SourceError;
use crate::QuestionSource;

/// Loads a bank file, or every bank under a directory.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> anyhow::Result<Vec<Question>> {
        if !self.path.exists() {
            return Err(SourceError::NotFound(self.name.clone()).into());
        }

        let path = self.path.clone();
        let questions = tokio::task::spawn_blocking(move || load_bank(&path)).await??;
        tracing::info!(count = questions.len(), source = %self.name, "loaded question bank");
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examprep_core::ExamError;

    const BANK: &str = r#"[
        {"id": 1, "type": "fill-in", "question": "Smart pointer for shared ownership?", "answer": "Rc"},
        {"id": 2, "type": "true-false", "question": "Box allocates on the heap.", "answer": "True"}
    ]"#;

    #[tokio::test]
    async fn loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        std::fs::write(&path, BANK).unwrap();

        let questions = FileSource::new(&path).load().await.unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn loads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), BANK).unwrap();
        std::fs::write(dir.path().join("b.json"), BANK).unwrap();

        let questions = FileSource::new(dir.path()).load().await.unwrap();
        assert_eq!(questions.len(), 4);
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let err = FileSource::new("/nonexistent/bank.json")
            .load()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_bank_surfaces_exam_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        let err = FileSource::new(&path).load().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExamError>(),
            Some(&ExamError::EmptyQuestionBank)
        );
    }
}
