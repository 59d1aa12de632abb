//! Exam configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_DURATION_SECS;
use crate::scoring::DEFAULT_PASSING_THRESHOLD;

/// Top-level examprep configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamConfig {
    /// Questions drawn per exam.
    pub question_count: usize,
    /// Time limit in seconds.
    pub duration_secs: u64,
    /// Pass mark in percent.
    pub passing_threshold: u32,
    /// Default question bank: a file, a directory, or an http(s) URL.
    pub bank: Option<String>,
    /// Label recorded with each result.
    pub exam_type: String,
    /// Where `take` writes results.
    pub output_dir: PathBuf,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            question_count: 40,
            duration_secs: DEFAULT_DURATION_SECS,
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            bank: None,
            exam_type: "practice".to_string(),
            output_dir: PathBuf::from("./examprep-results"),
        }
    }
}

impl ExamConfig {
    /// Reject values an exam cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.question_count == 0 {
            anyhow::bail!("question_count must be greater than 0");
        }
        if self.duration_secs == 0 {
            anyhow::bail!("duration_secs must be greater than 0");
        }
        if self.passing_threshold > 100 {
            anyhow::bail!(
                "passing_threshold must be between 0 and 100, got {}",
                self.passing_threshold
            );
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(bank) = std::env::var("EXAMPREP_BANK") {
            self.bank = Some(bank);
        }
        if let Ok(count) = std::env::var("EXAMPREP_QUESTION_COUNT") {
            self.question_count = count
                .trim()
                .parse()
                .with_context(|| format!("invalid EXAMPREP_QUESTION_COUNT: {count}"))?;
        }
        if let Ok(secs) = std::env::var("EXAMPREP_DURATION_SECS") {
            self.duration_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid EXAMPREP_DURATION_SECS: {secs}"))?;
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string. Substituted values are not
/// expanded again.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        cursor = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examprep.toml` in the current directory
/// 2. `~/.config/examprep/config.toml`
///
/// Environment variable overrides: `EXAMPREP_BANK`, `EXAMPREP_QUESTION_COUNT`,
/// `EXAMPREP_DURATION_SECS`.
pub fn load_config() -> Result<ExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examprep.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => ExamConfig::default(),
    };

    config.apply_env_overrides()?;
    config.bank = config.bank.as_deref().map(resolve_env_vars);
    config.validate().with_context(|| match &config_path {
        Some(path) => format!("invalid config: {}", path.display()),
        None => "invalid config from environment".to_string(),
    })?;

    tracing::debug!(?config_path, "loaded config");
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<ExamConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ExamConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examprep"))
}
