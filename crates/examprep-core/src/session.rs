//! Exam session state.
//!
//! Owns the selected questions, the answer slots, the review marks, and the
//! navigation cursor. Every operation is synchronous and leaves the session in
//! a valid state; invalid positions are rejected without touching anything.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{is_answered, Answer, Question};

/// How navigation currently moves through the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every question, in exam order.
    Normal,
    /// Only the marked questions, in the order they were marked.
    ReviewSubset,
}

/// Display status of one question. A mark wins over an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Answered,
    Marked,
    Unanswered,
}

/// Result of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The cursor now sits on this question position.
    Moved(usize),
    /// Already at the boundary; nothing changed.
    Stayed,
    /// Advanced past the last question in normal mode.
    ExamComplete,
    /// Advanced past the last review item, or the review set emptied. The
    /// session is back in normal mode.
    ReviewComplete,
}

/// Counts for the pre-submission summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub marked: usize,
}

/// One candidate's pass through an exam.
#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Vec<Question>,
    answers: Vec<Option<Answer>>,
    marked: Vec<usize>,
    current: usize,
    mode: Mode,
    review_order: Vec<usize>,
    review_cursor: usize,
    bank_topics: Vec<String>,
}

impl ExamSession {
    /// Shuffle `bank` and keep the first `requested` questions.
    ///
    /// # Errors
    ///
    /// Returns [`ExamError::EmptyQuestionBank`] if `bank` is empty.
    pub fn initialize(bank: Vec<Question>, requested: usize) -> Result<Self, ExamError> {
        Self::initialize_with_rng(bank, requested, &mut rand::rng())
    }

    /// Like [`ExamSession::initialize`] with a caller-supplied random source.
    ///
    /// The shuffle is a uniform Fisher-Yates pass from the last element to the
    /// first. A request of zero questions is treated as one.
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        mut bank: Vec<Question>,
        requested: usize,
        rng: &mut R,
    ) -> Result<Self, ExamError> {
        if bank.is_empty() {
            return Err(ExamError::EmptyQuestionBank);
        }

        let mut seen = HashSet::new();
        let bank_topics: Vec<String> = bank
            .iter()
            .filter(|q| seen.insert(q.topic.clone()))
            .map(|q| q.topic.clone())
            .collect();

        bank.shuffle(rng);
        let count = requested.max(1).min(bank.len());
        bank.truncate(count);

        tracing::debug!(
            selected = count,
            topics = bank_topics.len(),
            "initialized exam session"
        );

        Ok(Self {
            answers: vec![None; bank.len()],
            questions: bank,
            marked: Vec::new(),
            current: 0,
            mode: Mode::Normal,
            review_order: Vec::new(),
            review_cursor: 0,
            bank_topics,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_position(&self) -> usize {
        self.current
    }

    /// Number of questions in the exam. Never zero.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The recorded answer at `position`, if any.
    pub fn answer(&self, position: usize) -> Option<&Answer> {
        self.answers.get(position).and_then(Option::as_ref)
    }

    /// Marked positions in the order they were marked.
    pub fn marked(&self) -> &[usize] {
        &self.marked
    }

    pub fn is_marked(&self, position: usize) -> bool {
        self.marked.contains(&position)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Positions visited in review-subset mode. Only meaningful in that mode.
    pub fn review_order(&self) -> &[usize] {
        &self.review_order
    }

    pub fn review_cursor(&self) -> usize {
        self.review_cursor
    }

    /// Distinct topics of the full bank the exam was drawn from, in bank order.
    pub fn bank_topics(&self) -> &[String] {
        &self.bank_topics
    }

    /// Whether "previous" would move anywhere in the current mode.
    pub fn is_first(&self) -> bool {
        match self.mode {
            Mode::Normal => self.current == 0,
            Mode::ReviewSubset => self.review_cursor == 0,
        }
    }

    /// Whether "next" would finish the exam or the review in the current mode.
    pub fn is_last(&self) -> bool {
        match self.mode {
            Mode::Normal => self.current + 1 == self.questions.len(),
            Mode::ReviewSubset => self.review_cursor + 1 >= self.review_order.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Overwrite the answer slot at `position`. The value is stored as given.
    pub fn record_answer(&mut self, position: usize, answer: Answer) -> Result<(), ExamError> {
        self.check(position)?;
        self.answers[position] = Some(answer);
        Ok(())
    }

    /// Flip the review mark on `position`. Returns whether it is now marked.
    pub fn toggle_mark(&mut self, position: usize) -> Result<bool, ExamError> {
        self.check(position)?;
        if let Some(index) = self.marked.iter().position(|&p| p == position) {
            self.marked.remove(index);
            Ok(false)
        } else {
            self.marked.push(position);
            Ok(true)
        }
    }

    /// Move forward one step in the current mode.
    pub fn advance(&mut self) -> Navigation {
        match self.mode {
            Mode::Normal if self.current + 1 < self.questions.len() => {
                self.current += 1;
                Navigation::Moved(self.current)
            }
            Mode::Normal => Navigation::ExamComplete,
            Mode::ReviewSubset if self.review_cursor + 1 < self.review_order.len() => {
                self.review_cursor += 1;
                self.current = self.review_order[self.review_cursor];
                Navigation::Moved(self.current)
            }
            Mode::ReviewSubset => {
                self.mode = Mode::Normal;
                Navigation::ReviewComplete
            }
        }
    }

    /// Move back one step in the current mode. Does nothing at the start.
    pub fn retreat(&mut self) -> Navigation {
        match self.mode {
            Mode::Normal if self.current > 0 => {
                self.current -= 1;
                Navigation::Moved(self.current)
            }
            Mode::ReviewSubset if self.review_cursor > 0 => {
                self.review_cursor -= 1;
                self.current = self.review_order[self.review_cursor];
                Navigation::Moved(self.current)
            }
            _ => Navigation::Stayed,
        }
    }

    /// Jump straight to `position`, leaving review-subset mode.
    pub fn jump_to(&mut self, position: usize) -> Result<(), ExamError> {
        self.check(position)?;
        self.mode = Mode::Normal;
        self.current = position;
        Ok(())
    }

    /// Restrict navigation to the marked questions.
    ///
    /// # Errors
    ///
    /// Returns [`ExamError::EmptySelection`] when nothing is marked; the session
    /// is left unchanged.
    pub fn enter_review_subset(&mut self) -> Result<usize, ExamError> {
        let Some(&first) = self.marked.first() else {
            return Err(ExamError::EmptySelection);
        };
        self.mode = Mode::ReviewSubset;
        self.review_order = self.marked.clone();
        self.review_cursor = 0;
        self.current = first;
        Ok(first)
    }

    /// Unmark `position` and drop it from the review order.
    ///
    /// Returns [`Navigation::ReviewComplete`] when the review order empties,
    /// otherwise the position the cursor settles on.
    pub fn remove_from_review(&mut self, position: usize) -> Result<Navigation, ExamError> {
        self.check(position)?;
        self.marked.retain(|&p| p != position);

        if self.mode != Mode::ReviewSubset {
            return Ok(Navigation::Stayed);
        }

        if let Some(index) = self.review_order.iter().position(|&p| p == position) {
            self.review_order.remove(index);
            if index < self.review_cursor {
                self.review_cursor -= 1;
            }
        }

        if self.review_order.is_empty() {
            self.mode = Mode::Normal;
            self.review_cursor = 0;
            return Ok(Navigation::ReviewComplete);
        }

        if self.review_cursor >= self.review_order.len() {
            self.review_cursor = self.review_order.len() - 1;
        }
        self.current = self.review_order[self.review_cursor];
        Ok(Navigation::Moved(self.current))
    }

    /// Return to normal navigation. Marks are kept.
    pub fn exit_review_subset(&mut self) {
        self.mode = Mode::Normal;
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub fn question_status(&self, position: usize) -> Result<QuestionStatus, ExamError> {
        self.check(position)?;
        Ok(if self.is_marked(position) {
            QuestionStatus::Marked
        } else if is_answered(self.answer(position)) {
            QuestionStatus::Answered
        } else {
            QuestionStatus::Unanswered
        })
    }

    /// `(answered, total)`. Marks do not matter here, only completion.
    pub fn progress(&self) -> (usize, usize) {
        let answered = self
            .answers
            .iter()
            .filter(|slot| is_answered(slot.as_ref()))
            .count();
        (answered, self.questions.len())
    }

    pub fn summary(&self) -> SessionSummary {
        let (answered, total) = self.progress();
        SessionSummary {
            total,
            answered,
            unanswered: total - answered,
            marked: self.marked.len(),
        }
    }

    fn check(&self, position: usize) -> Result<(), ExamError> {
        if position < self.questions.len() {
            Ok(())
        } else {
            tracing::warn!(position, len = self.questions.len(), "rejected out-of-range position");
            Err(ExamError::OutOfRangeNavigation {
                position,
                len: self.questions.len(),
            })
        }
    }
}
