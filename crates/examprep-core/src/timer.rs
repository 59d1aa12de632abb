//! Exam countdown timer.
//!
//! [`ExamTimer`] is a plain state machine advanced one second per
//! [`ExamTimer::tick`]. What produces those ticks is a [`Ticker`]: a real
//! tokio interval in production, a channel in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Remaining seconds at or below which the display turns to a warning.
pub const WARNING_THRESHOLD_SECS: u64 = 300;
/// Remaining seconds at or below which the display turns critical.
pub const CRITICAL_THRESHOLD_SECS: u64 = 60;

pub type TickCallback = Box<dyn FnMut(u64) + Send>;
pub type ExpireCallback = Box<dyn FnOnce() + Send>;

/// Lifecycle of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Running,
    Expired,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running; nothing happened.
    Ignored,
    /// One second elapsed; this many remain.
    Ticked(u64),
    /// The countdown reached zero on this tick.
    Expired,
}

/// How close the exam is to running out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

impl Urgency {
    pub fn from_remaining(remaining_secs: u64) -> Self {
        if remaining_secs <= CRITICAL_THRESHOLD_SECS {
            Urgency::Critical
        } else if remaining_secs <= WARNING_THRESHOLD_SECS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

/// Countdown that fires `on_tick` every second and `on_expire` exactly once.
pub struct ExamTimer {
    duration_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    on_tick: Option<TickCallback>,
    on_expire: Option<ExpireCallback>,
}

impl std::fmt::Debug for ExamTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamTimer")
            .field("duration_secs", &self.duration_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("state", &self.state)
            .finish()
    }
}

impl Default for ExamTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamTimer {
    pub fn new() -> Self {
        Self {
            duration_secs: 0,
            remaining_secs: 0,
            state: TimerState::Idle,
            on_tick: None,
            on_expire: None,
        }
    }

    /// Start counting down from `duration_secs`. Restarting replaces any
    /// previous countdown and callbacks.
    pub fn start(
        &mut self,
        duration_secs: u64,
        on_tick: impl FnMut(u64) + Send + 'static,
        on_expire: impl FnOnce() + Send + 'static,
    ) {
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.state = TimerState::Running;
        self.on_tick = Some(Box::new(on_tick));
        self.on_expire = Some(Box::new(on_expire));
        tracing::debug!(duration_secs, "timer started");
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if let Some(on_tick) = self.on_tick.as_mut() {
            on_tick(self.remaining_secs);
        }

        if self.remaining_secs > 0 {
            return TickOutcome::Ticked(self.remaining_secs);
        }

        self.state = TimerState::Expired;
        self.on_tick = None;
        if let Some(on_expire) = self.on_expire.take() {
            on_expire();
        }
        tracing::debug!("timer expired");
        TickOutcome::Expired
    }

    /// Halt the countdown. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
            tracing::debug!(remaining_secs = self.remaining_secs, "timer stopped");
        }
        self.on_tick = None;
        self.on_expire = None;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Seconds used so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.duration_secs - self.remaining_secs
    }
}

/// Format seconds as `MM:SS`.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

// ---------------------------------------------------------------------------
// Tick sources
// ---------------------------------------------------------------------------

/// Source of the once-per-second schedule driving an [`ExamTimer`].
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick.
    async fn tick(&mut self);
}

/// Wall-clock ticker backed by `tokio::time::interval`.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Tick every `period`, first tick one period from now.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker fed by hand through a channel. Once every sender is gone it never
/// ticks again.
pub struct ChannelTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ChannelTicker {
    pub fn channel() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
