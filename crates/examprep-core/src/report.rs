//! Exam report types with JSON persistence.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, QuestionKind};
use crate::statistics::{TopicBand, TopicStat};
use crate::timer::format_clock;

/// Outcome of one scoring pass. Contains no wall-clock data, so scoring the same
/// session twice yields equal reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamReport {
    /// `round(100 * score / total_questions)`.
    pub score_percentage: u32,
    /// `score_percentage >= passing threshold`.
    pub passed: bool,
    /// Number of questions answered correctly.
    pub score: u32,
    pub total_questions: u32,
    /// Seconds between timer start and submission.
    pub time_taken_seconds: u64,
    /// Questions still marked for review at submission.
    pub marked_count: u32,
    /// Per-topic results in first-appearance order.
    pub topic_stats: Vec<TopicStat>,
    /// Incorrect questions in exam order.
    pub missed: Vec<MissedRecord>,
}

/// A question the candidate got wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedRecord {
    /// Question prompt.
    pub question: String,
    /// 0-based position in the exam.
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// What the candidate submitted, `None` if unanswered.
    pub submitted_answer: Option<Answer>,
    pub expected_answer: Answer,
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// `(correct zones, total zones)` for drag-and-drop questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones_correct: Option<(usize, usize)>,
}

impl MissedRecord {
    /// Display text for the submitted answer.
    pub fn submitted_display(&self) -> String {
        match &self.submitted_answer {
            Some(answer) if !answer.is_blank() => answer.display(),
            _ => "Not answered".to_string(),
        }
    }
}

impl ExamReport {
    /// Topics grouped by band, weakest band first. Empty bands are left out.
    pub fn topics_by_band(&self) -> Vec<(TopicBand, Vec<&TopicStat>)> {
        [TopicBand::Weak, TopicBand::Average, TopicBand::Strong]
            .into_iter()
            .map(|band| {
                let stats: Vec<&TopicStat> = self
                    .topic_stats
                    .iter()
                    .filter(|stat| stat.band() == band)
                    .collect();
                (band, stats)
            })
            .filter(|(_, stats)| !stats.is_empty())
            .collect()
    }

    /// Topics worth studying before the next attempt.
    pub fn focus_topics(&self) -> Vec<&str> {
        self.topic_stats
            .iter()
            .filter(|stat| stat.band() == TopicBand::Weak)
            .map(|stat| stat.topic.as_str())
            .collect()
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Result:** {} ({}%, {}/{} correct)\n\n",
            if self.passed { "PASSED" } else { "FAILED" },
            self.score_percentage,
            self.score,
            self.total_questions
        ));
        md.push_str(&format!(
            "**Time taken:** {}  \n**Marked for review:** {}\n\n",
            format_clock(self.time_taken_seconds),
            self.marked_count
        ));

        if !self.topic_stats.is_empty() {
            md.push_str("### Topics\n\n");
            md.push_str("| Topic | Correct | Total | Score | Band |\n");
            md.push_str("|-------|---------|-------|-------|------|\n");
            for (band, stats) in self.topics_by_band() {
                for s in stats {
                    md.push_str(&format!(
                        "| {} | {} | {} | {}% | {} |\n",
                        s.topic, s.correct, s.total, s.percentage, band
                    ));
                }
            }
            md.push('\n');
        }

        let focus = self.focus_topics();
        if !focus.is_empty() {
            md.push_str("### Recommended focus\n\n");
            for topic in focus {
                md.push_str(&format!("- {topic}\n"));
            }
            md.push('\n');
        }

        if !self.missed.is_empty() {
            md.push_str("### Missed questions\n\n");
            for m in &self.missed {
                md.push_str(&format!(
                    "{}. **{}** ({}, {})\n",
                    m.position + 1,
                    m.question,
                    m.topic,
                    m.kind
                ));
                md.push_str(&format!(
                    "   - Your answer: {}\n",
                    m.submitted_display().replace('\n', "; ")
                ));
                md.push_str(&format!(
                    "   - Correct answer: {}\n",
                    m.expected_answer.display().replace('\n', "; ")
                ));
            }
        }

        md
    }
}

// ---------------------------------------------------------------------------
// Saved records
// ---------------------------------------------------------------------------

/// Why the exam ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    /// The candidate submitted.
    Submitted,
    /// The countdown reached zero.
    TimeExpired,
    /// Input closed before submission; whatever was answered is scored.
    Abandoned,
}

impl fmt::Display for SubmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitReason::Submitted => write!(f, "submitted"),
            SubmitReason::TimeExpired => write!(f, "time expired"),
            SubmitReason::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Who sat the exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub exam_type: String,
}

/// A finished exam as saved to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the exam was submitted.
    pub created_at: DateTime<Utc>,
    pub candidate: Candidate,
    /// Pass mark the report was scored against.
    pub passing_threshold: u32,
    pub reason: SubmitReason,
    pub report: ExamReport,
}

impl ExamRecord {
    pub fn new(
        candidate: Candidate,
        passing_threshold: u32,
        reason: SubmitReason,
        report: ExamReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            candidate,
            passing_threshold,
            reason,
            report,
        }
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize exam record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write exam record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read exam record from {}", path.display()))?;
        let record: ExamRecord =
            serde_json::from_str(&content).context("failed to parse exam record JSON")?;
        Ok(record)
    }

    /// File stem used when saving, e.g. `exam-jane-doe-20261019-142500`.
    pub fn file_stem(&self) -> String {
        let slug: String = self
            .candidate
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        format!("exam-{}-{}", slug, self.created_at.format("%Y%m%d-%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Placement, ZoneId};

    fn stat(topic: &str, correct: u32, total: u32, percentage: u32) -> TopicStat {
        TopicStat {
            topic: topic.into(),
            total,
            correct,
            percentage,
        }
    }

    fn sample_report() -> ExamReport {
        let mut placed = Placement::new();
        placed.insert(ZoneId::new(0), "B".into());
        ExamReport {
            score_percentage: 50,
            passed: false,
            score: 2,
            total_questions: 4,
            time_taken_seconds: 125,
            marked_count: 1,
            topic_stats: vec![
                stat("Ownership", 2, 2, 100),
                stat("Traits", 0, 1, 0),
                stat("Lifetimes", 2, 3, 67),
            ],
            missed: vec![
                MissedRecord {
                    question: "What is a trait?".into(),
                    position: 1,
                    code: None,
                    submitted_answer: None,
                    expected_answer: Answer::Text("interface".into()),
                    topic: "Traits".into(),
                    kind: QuestionKind::FillIn,
                    zones_correct: None,
                },
                MissedRecord {
                    question: "Match lifetimes".into(),
                    position: 3,
                    code: None,
                    submitted_answer: Some(Answer::Placement(placed)),
                    expected_answer: Answer::Placement(Placement::new()),
                    topic: "Lifetimes".into(),
                    kind: QuestionKind::DragAndDrop,
                    zones_correct: Some((0, 1)),
                },
            ],
        }
    }

    #[test]
    fn bands_are_ordered_weak_first() {
        let report = sample_report();
        let bands = report.topics_by_band();
        let order: Vec<TopicBand> = bands.iter().map(|(band, _)| *band).collect();
        assert_eq!(
            order,
            vec![TopicBand::Weak, TopicBand::Average, TopicBand::Strong]
        );
        assert_eq!(bands[0].1[0].topic, "Traits");
        assert_eq!(report.focus_topics(), vec!["Traits"]);
    }

    #[test]
    fn empty_bands_are_skipped() {
        let mut report = sample_report();
        report.topic_stats = vec![stat("Ownership", 1, 1, 100)];
        let bands = report.topics_by_band();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].0, TopicBand::Strong);
        assert!(report.focus_topics().is_empty());
    }

    #[test]
    fn markdown_mentions_result_and_missed() {
        let md = sample_report().to_markdown();
        assert!(md.contains("FAILED"));
        assert!(md.contains("02:05"));
        assert!(md.contains("- Traits"));
        assert!(md.contains("Your answer: Not answered"));
        assert!(md.contains("Your answer: Zone 1: B"));
    }

    #[test]
    fn report_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["scorePercentage"], 50);
        assert_eq!(json["timeTakenSeconds"], 125);
        assert_eq!(json["missed"][0]["type"], "fill-in");
        assert_eq!(json["missed"][1]["submittedAnswer"]["kind"], "placement");
    }

    #[test]
    fn save_and_load_record() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = Candidate {
            name: "Jane Doe".into(),
            student_id: Some("S-1".into()),
            exam_type: "practice".into(),
        };
        let record = ExamRecord::new(candidate, 80, SubmitReason::TimeExpired, sample_report());
        let path = dir.path().join("nested").join("record.json");
        record.save_json(&path).unwrap();

        let loaded = ExamRecord::load_json(&path).unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.reason, SubmitReason::TimeExpired);
        assert_eq!(loaded.report, record.report);
        assert_eq!(loaded.candidate, record.candidate);
    }

    #[test]
    fn load_missing_record_has_context() {
        let err = ExamRecord::load_json(Path::new("/nonexistent/record.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read exam record"));
    }

    #[test]
    fn file_stem_is_slugged() {
        let candidate = Candidate {
            name: "  Jane  O'Doe ".into(),
            student_id: None,
            exam_type: "practice".into(),
        };
        let record = ExamRecord::new(candidate, 80, SubmitReason::Submitted, sample_report());
        assert!(record.file_stem().starts_with("exam-jane-o-doe-"));
    }
}
