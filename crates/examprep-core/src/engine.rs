//! Exam engine.
//!
//! Drives one [`ExamSession`] and its [`ExamTimer`] from a single task. User
//! commands and timer ticks are serialized through one `select!` loop, so each
//! runs to completion before the next starts and the core needs no locks.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::ExamError;
use crate::evaluator::{AnswerEvaluator, StandardEvaluator};
use crate::model::AnswerInput;
use crate::report::{ExamReport, SubmitReason};
use crate::scoring::{Scorer, DEFAULT_PASSING_THRESHOLD};
use crate::session::{ExamSession, Mode, Navigation};
use crate::timer::{ExamTimer, TickOutcome, Ticker, CRITICAL_THRESHOLD_SECS, WARNING_THRESHOLD_SECS};

/// Default exam length: 45 minutes.
pub const DEFAULT_DURATION_SECS: u64 = 45 * 60;

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamEvent {
    QuestionChanged { position: usize },
    AnswerRecorded { position: usize },
    MarkToggled { position: usize, marked: bool },
    TimerTick { remaining_secs: u64 },
    TimerExpired,
    /// "Next" was pressed on the last question; show the summary.
    ExamComplete,
    /// The summary was asked for directly.
    SummaryShown,
    ReviewEntered { count: usize },
    /// The review subset is finished or emptied; back to normal navigation.
    ReviewComplete,
    ReviewExited,
    /// `Submit` arrived with questions still marked. Another `Submit` right
    /// away confirms it.
    SubmitPending { marked: usize },
    /// A command was refused. The session is unchanged.
    Rejected(ExamError),
    Submitted { reason: SubmitReason },
}

/// Receives engine events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ExamEvent, session: &ExamSession);
}

/// Sink that drops every event.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _: &ExamEvent, _: &ExamSession) {}
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// Toggle the review mark on the current question.
    ToggleMark,
    /// Answer the current question.
    Answer(AnswerInput),
    /// Go to a 0-based position, leaving review mode.
    JumpTo(usize),
    EnterReview,
    /// Unmark the current question and drop it from the review subset.
    RemoveFromReview,
    ExitReview,
    /// Show the answered/unanswered/marked overview.
    ShowSummary,
    /// Submit the exam. With questions still marked, the first `Submit` only
    /// warns and the next consecutive one submits.
    Submit,
}

/// Whether the engine keeps accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished(SubmitReason),
}

/// What [`ExamEngine::run`] hands back.
#[derive(Debug, Clone)]
pub struct ExamOutcome {
    pub report: ExamReport,
    pub reason: SubmitReason,
}

/// Owns the session and timer for one exam.
pub struct ExamEngine {
    session: ExamSession,
    timer: ExamTimer,
    duration_secs: u64,
    passing_threshold: u32,
    sink: Arc<dyn EventSink>,
    evaluator: Arc<dyn AnswerEvaluator>,
    finished: Option<SubmitReason>,
    submit_pending: bool,
}

impl ExamEngine {
    pub fn new(session: ExamSession, duration_secs: u64) -> Self {
        Self {
            session,
            timer: ExamTimer::new(),
            duration_secs,
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            sink: Arc::new(NoopSink),
            evaluator: Arc::new(StandardEvaluator),
            finished: None,
            submit_pending: false,
        }
    }

    pub fn with_threshold(mut self, passing_threshold: u32) -> Self {
        self.passing_threshold = passing_threshold;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn timer(&self) -> &ExamTimer {
        &self.timer
    }

    /// `Some(reason)` once the exam has ended.
    pub fn finished(&self) -> Option<SubmitReason> {
        self.finished
    }

    /// Start the countdown and show the first question. Does nothing if already
    /// started or finished.
    pub fn start(&mut self) {
        if self.finished.is_some() || self.timer.is_running() {
            return;
        }
        tracing::info!(
            questions = self.session.len(),
            duration_secs = self.duration_secs,
            "exam started"
        );
        self.timer.start(
            self.duration_secs,
            |remaining| {
                if remaining == WARNING_THRESHOLD_SECS || remaining == CRITICAL_THRESHOLD_SECS {
                    tracing::info!(remaining, "time running low");
                }
            },
            || tracing::info!("time is up, submitting"),
        );
        self.emit(ExamEvent::QuestionChanged {
            position: self.session.current_position(),
        });
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Recoverable [`ExamError`]s (nothing marked, bad position, unusable input)
    /// leave the session as it was.
    pub fn handle(&mut self, command: Command) -> Result<Flow, ExamError> {
        if let Some(reason) = self.finished {
            tracing::debug!(?command, "ignoring command after exam ended");
            return Ok(Flow::Finished(reason));
        }
        tracing::debug!(?command, "handling command");
        let confirming = std::mem::take(&mut self.submit_pending);

        match command {
            Command::Next => {
                let nav = self.session.advance();
                self.navigated(nav);
            }
            Command::Previous => {
                let nav = self.session.retreat();
                self.navigated(nav);
            }
            Command::ToggleMark => {
                let position = self.session.current_position();
                let marked = self.session.toggle_mark(position)?;
                self.emit(ExamEvent::MarkToggled { position, marked });
            }
            Command::Answer(input) => {
                let position = self.session.current_position();
                let answer = input.resolve(
                    self.session.current_question(),
                    position,
                    self.session.answer(position),
                )?;
                self.session.record_answer(position, answer)?;
                self.emit(ExamEvent::AnswerRecorded { position });
            }
            Command::JumpTo(position) => {
                let was_reviewing = self.session.mode() == Mode::ReviewSubset;
                self.session.jump_to(position)?;
                if was_reviewing {
                    self.emit(ExamEvent::ReviewExited);
                }
                self.emit(ExamEvent::QuestionChanged { position });
            }
            Command::EnterReview => {
                let first = self.session.enter_review_subset()?;
                self.emit(ExamEvent::ReviewEntered {
                    count: self.session.review_order().len(),
                });
                self.emit(ExamEvent::QuestionChanged { position: first });
            }
            Command::RemoveFromReview => {
                let position = self.session.current_position();
                let was_marked = self.session.is_marked(position);
                let nav = self.session.remove_from_review(position)?;
                if was_marked {
                    self.emit(ExamEvent::MarkToggled {
                        position,
                        marked: false,
                    });
                }
                self.navigated(nav);
            }
            Command::ExitReview => {
                self.session.exit_review_subset();
                self.emit(ExamEvent::ReviewExited);
            }
            Command::ShowSummary => self.emit(ExamEvent::SummaryShown),
            Command::Submit => {
                let marked = self.session.marked().len();
                if marked > 0 && !confirming {
                    self.submit_pending = true;
                    self.emit(ExamEvent::SubmitPending { marked });
                } else {
                    return Ok(self.finish(SubmitReason::Submitted));
                }
            }
        }

        Ok(Flow::Continue)
    }

    /// Advance the countdown one second. Expiry submits the exam.
    pub fn on_tick(&mut self) -> Flow {
        match self.timer.tick() {
            TickOutcome::Ignored => match self.finished {
                Some(reason) => Flow::Finished(reason),
                None => Flow::Continue,
            },
            TickOutcome::Ticked(remaining_secs) => {
                self.emit(ExamEvent::TimerTick { remaining_secs });
                Flow::Continue
            }
            TickOutcome::Expired => {
                self.emit(ExamEvent::TimerTick { remaining_secs: 0 });
                self.emit(ExamEvent::TimerExpired);
                self.finish(SubmitReason::TimeExpired)
            }
        }
    }

    /// End the exam. The first reason wins; later calls change nothing.
    pub fn finish(&mut self, reason: SubmitReason) -> Flow {
        if let Some(existing) = self.finished {
            return Flow::Finished(existing);
        }
        self.timer.stop();
        self.finished = Some(reason);
        tracing::info!(
            %reason,
            elapsed_secs = self.timer.elapsed_secs(),
            "exam submitted"
        );
        self.emit(ExamEvent::Submitted { reason });
        Flow::Finished(reason)
    }

    /// Score the session. An exam that never finished counts as abandoned.
    pub fn outcome(&self) -> Result<ExamOutcome, ExamError> {
        let report = Scorer::new(self.evaluator.as_ref())
            .with_threshold(self.passing_threshold)
            .score(&self.session, self.timer.elapsed_secs())?;
        Ok(ExamOutcome {
            report,
            reason: self.finished.unwrap_or(SubmitReason::Abandoned),
        })
    }

    /// Run the exam until it is submitted, the time runs out, or `commands`
    /// closes.
    pub async fn run<T: Ticker + ?Sized>(
        &mut self,
        mut commands: mpsc::Receiver<Command>,
        ticker: &mut T,
    ) -> Result<ExamOutcome, ExamError> {
        self.start();

        while self.finished.is_none() {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Err(e) = self.handle(command) {
                            tracing::warn!("command rejected: {e}");
                            self.emit(ExamEvent::Rejected(e));
                        }
                    }
                    None => {
                        tracing::warn!("input closed before submission");
                        self.finish(SubmitReason::Abandoned);
                    }
                },
                () = ticker.tick() => {
                    self.on_tick();
                }
            }
        }

        self.outcome()
    }

    fn navigated(&mut self, nav: Navigation) {
        match nav {
            Navigation::Moved(position) => self.emit(ExamEvent::QuestionChanged { position }),
            Navigation::Stayed => {}
            Navigation::ExamComplete => self.emit(ExamEvent::ExamComplete),
            Navigation::ReviewComplete => {
                self.emit(ExamEvent::ReviewComplete);
                self.emit(ExamEvent::QuestionChanged {
                    position: self.session.current_position(),
                });
            }
        }
    }

    fn emit(&self, event: ExamEvent) {
        self.sink.emit(&event, &self.session);
    }
}
