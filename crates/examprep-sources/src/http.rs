//! HTTP(S) question bank source.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use examprep_core::model::Question;
use examprep_core::parser::{looks_like_html, parse_bank_str, BankFormat};
use examprep_core::ExamError;

use crate::error::SourceError;
use crate::QuestionSource;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches a bank with a single GET request.
pub struct HttpSource {
    url: String,
    format: BankFormat,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    /// The bank format follows the URL's extension; JSON unless it ends in `.toml`.
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;

        let path = url.split(['?', '#']).next().unwrap_or(url);
        let format = if path.to_ascii_lowercase().ends_with(".toml") {
            BankFormat::Toml
        } else {
            BankFormat::Json
        };

        Ok(Self {
            url: url.to_string(),
            format,
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> anyhow::Result<Vec<Question>> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                SourceError::Network(format!("could not reach {}", self.url))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SourceError::NotFound(self.url.clone()).into());
        }
        if status >= 400 {
            return Err(SourceError::Http {
                status,
                url: self.url.clone(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        if looks_like_html(&body) {
            return Err(SourceError::Parse(format!(
                "received HTML instead of JSON from {}; check that the question file exists",
                self.url
            ))
            .into());
        }

        let questions = parse_bank_str(&body, self.format, &self.url).map_err(|e| {
            if e.downcast_ref::<ExamError>().is_some() {
                e
            } else {
                SourceError::Parse(format!("{e:#}")).into()
            }
        })?;
        tracing::info!(count = questions.len(), "loaded question bank");
        Ok(questions)
    }
}
