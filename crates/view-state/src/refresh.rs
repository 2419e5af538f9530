//! Timing for the refresh control.
//!
//! Time is passed in by the caller as a [`Duration`] since any fixed epoch,
//! so the same machinery runs off `performance.now()` in the browser and off
//! an [`std::time::Instant`] in the terminal.

use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
pub const DEFAULT_MIN_DWELL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Quiet period that coalesces repeated refresh requests.
    pub debounce: Duration,
    /// Earliest point after the cycle starts at which the reload is issued.
    pub min_dwell: Duration,
    /// Latest point after the cycle starts at which it is forced complete.
    pub max_timeout: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_dwell: DEFAULT_MIN_DWELL,
            max_timeout: DEFAULT_MAX_TIMEOUT,
        }
    }
}

impl RefreshPolicy {
    /// Raises `max_timeout` to `min_dwell` when configured below it.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            max_timeout: self.max_timeout.max(self.min_dwell),
            ..self
        }
    }
}

/// How a refresh cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Reloaded,
    Failed,
    TimedOut,
}

/// What a poll asks the platform to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshTick {
    pub reload: bool,
    pub completed: Option<Completion>,
}

/// One refresh cycle: a dwell timer racing a timeout, behind a single latch.
///
/// The reload is issued at most once. Whichever of `finish` or the timeout
/// gets there first completes the cycle; everything after is a no-op.
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    id: u64,
    started_at: Duration,
    policy: RefreshPolicy,
    reload_issued: bool,
    completion: Option<Completion>,
}

impl RefreshCycle {
    /// `id` tells this cycle's reload apart from those of earlier cycles.
    pub fn start(id: u64, policy: RefreshPolicy, now: Duration) -> Self {
        Self {
            id,
            started_at: now,
            policy: policy.normalized(),
            reload_issued: false,
            completion: None,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub fn dwell_deadline(&self) -> Duration {
        self.started_at + self.policy.min_dwell
    }

    pub fn timeout_deadline(&self) -> Duration {
        self.started_at + self.policy.max_timeout
    }

    /// The next instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.completion.is_some() {
            return None;
        }
        if self.reload_issued {
            Some(self.timeout_deadline())
        } else {
            Some(self.dwell_deadline())
        }
    }

    pub fn poll(&mut self, now: Duration) -> RefreshTick {
        let mut tick = RefreshTick::default();
        if self.completion.is_some() {
            return tick;
        }

        let timed_out = now >= self.timeout_deadline();
        if !self.reload_issued && (timed_out || now >= self.dwell_deadline()) {
            self.reload_issued = true;
            tick.reload = true;
        }

        if timed_out {
            self.completion = Some(Completion::TimedOut);
            tick.completed = self.completion;
        }

        tick
    }

    /// Reports the outcome of the reload. Returns the outcome only if this
    /// call is the one that completed the cycle.
    pub fn finish(&mut self, outcome: Completion) -> Option<Completion> {
        if self.completion.is_some() {
            return None;
        }
        self.completion = Some(outcome);
        self.completion
    }

    pub const fn reload_issued(&self) -> bool {
        self.reload_issued
    }
}

/// Coalesces a burst of triggers into a single firing after a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restarts the quiet period.
    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
