//! Turns a finished session into an [`ExamReport`].

use crate::error::ExamError;
use crate::evaluator::{placement_count, AnswerEvaluator, StandardEvaluator};
use crate::model::QuestionKind;
use crate::report::{ExamReport, MissedRecord};
use crate::session::ExamSession;
use crate::statistics::{round_percentage, TopicTally};

/// Default pass mark, in percent.
pub const DEFAULT_PASSING_THRESHOLD: u32 = 80;

/// Scores sessions against a pass mark using an [`AnswerEvaluator`].
pub struct Scorer<'a> {
    evaluator: &'a dyn AnswerEvaluator,
    passing_threshold: u32,
}

impl Default for Scorer<'_> {
    fn default() -> Self {
        Self::new(&StandardEvaluator)
    }
}

impl<'a> Scorer<'a> {
    pub fn new(evaluator: &'a dyn AnswerEvaluator) -> Self {
        Self {
            evaluator,
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, passing_threshold: u32) -> Self {
        self.passing_threshold = passing_threshold;
        self
    }

    pub fn passing_threshold(&self) -> u32 {
        self.passing_threshold
    }

    /// Grade every question in exam order.
    ///
    /// Reads the session only, so calling it twice gives equal reports.
    ///
    /// # Errors
    ///
    /// Returns [`ExamError::EmptyExam`] for a session without questions.
    pub fn score(
        &self,
        session: &ExamSession,
        time_taken_seconds: u64,
    ) -> Result<ExamReport, ExamError> {
        if session.is_empty() {
            return Err(ExamError::EmptyExam);
        }

        let mut tally = TopicTally::new();
        let mut missed = Vec::new();
        let mut score = 0u32;

        for (position, question) in session.questions().iter().enumerate() {
            let submitted = session.answer(position);
            let correct = self.evaluator.is_correct(question, submitted);
            tally.record(&question.topic, correct);

            if correct {
                score += 1;
                continue;
            }

            missed.push(MissedRecord {
                question: question.question.clone(),
                position,
                code: question.code.clone(),
                submitted_answer: submitted.cloned(),
                expected_answer: question.expected_answer(),
                topic: question.topic.clone(),
                kind: question.kind,
                zones_correct: (question.kind == QuestionKind::DragAndDrop)
                    .then(|| placement_count(question, submitted)),
            });
        }

        let total_questions = session.len() as u32;
        let score_percentage = round_percentage(score, total_questions);
        let passed = score_percentage >= self.passing_threshold;

        tracing::debug!(
            score,
            total_questions,
            score_percentage,
            passed,
            "scored exam"
        );

        Ok(ExamReport {
            score_percentage,
            passed,
            score,
            total_questions,
            time_taken_seconds,
            marked_count: session.marked().len() as u32,
            topic_stats: tally.finish(),
            missed,
        })
    }
}

/// Score with the standard evaluator.
pub fn score(
    session: &ExamSession,
    passing_threshold: u32,
    time_taken_seconds: u64,
) -> Result<ExamReport, ExamError> {
    Scorer::default()
        .with_threshold(passing_threshold)
        .score(session, time_taken_seconds)
}
