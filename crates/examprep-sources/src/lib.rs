//! examprep-sources: Where question banks come from.
//!
//! Implements the `QuestionSource` trait for local files and directories and
//! for HTTP(S) URLs. Every source hands back parsed questions; nothing here
//! touches a running exam.

use async_trait::async_trait;

use examprep_core::model::Question;

pub mod error;
pub mod file;
pub mod http;

pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;

/// A place a question bank can be loaded from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable description of the location.
    fn name(&self) -> &str;

    /// Fetch and parse the whole bank.
    async fn load(&self) -> anyhow::Result<Vec<Question>>;
}

/// Pick a source for `location`: HTTP for `http://` and `https://`, the local
/// filesystem otherwise.
pub fn create_source(location: &str) -> anyhow::Result<Box<dyn QuestionSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_get_http_source() {
        let source = create_source("https://example.com/questions.json").unwrap();
        assert_eq!(source.name(), "https://example.com/questions.json");
    }

    #[test]
    fn paths_get_file_source() {
        let source = create_source("banks/rust.json").unwrap();
        assert_eq!(source.name(), "banks/rust.json");
    }
}
