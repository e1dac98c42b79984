// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change scheduling.
//!
//! The host mutates its tree in bursts, and the engine's own writes are
//! mutations too. [`ChangeScheduler`] turns any number of change
//! notifications into at most one pending pass: the first notification from
//! idle asks the caller to request a frame, later ones are coalesced until
//! the pass runs. A pass never runs inside another pass.
//!
//! The scheduler is a plain state machine; the browser backend supplies the
//! frame callback and the mutation feed.
//!
//! ```text
//!   notify()          frame fires          pass returns
//! Idle ──────▶ Scheduled ──────▶ Running ──────▶ Idle
//!                 ▲   │ notify(): coalesced         │ notified while running
//!                 └───┘                             ▼
//!                                               Scheduled
//! ```

/// How passes are triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerStrategy {
    /// Run one pass on the next display frame after a batch of changes.
    #[default]
    NextFrame,
    /// Run a pass on a fixed interval, regardless of changes.
    Poll {
        /// Interval between passes, in milliseconds.
        interval_ms: u32,
    },
}

impl SchedulerStrategy {
    /// Interval used by [`poll`](Self::poll).
    pub const DEFAULT_POLL_MS: u32 = 1000;

    /// Polling at the default interval.
    #[must_use]
    pub const fn poll() -> Self {
        Self::Poll {
            interval_ms: Self::DEFAULT_POLL_MS,
        }
    }

    /// Returns whether passes are driven by change notifications.
    #[must_use]
    pub const fn is_change_driven(self) -> bool {
        matches!(self, Self::NextFrame)
    }
}

/// Where the scheduler is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// No pass pending.
    Idle,
    /// A frame has been requested; a pass will run when it fires.
    Scheduled,
    /// A pass is executing.
    Running,
}

/// Coalesces change notifications into single reconciliation passes.
#[derive(Clone, Debug)]
pub struct ChangeScheduler {
    strategy: SchedulerStrategy,
    state: SchedulerState,
    notified_while_running: bool,
    passes: u64,
    coalesced: u64,
    refused: u64,
}

impl ChangeScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new(strategy: SchedulerStrategy) -> Self {
        Self {
            strategy,
            state: SchedulerState::Idle,
            notified_while_running: false,
            passes: 0,
            coalesced: 0,
            refused: 0,
        }
    }

    /// Returns the configured strategy.
    #[must_use]
    pub const fn strategy(&self) -> SchedulerStrategy {
        self.strategy
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Records a change notification.
    ///
    /// Returns `true` when the caller must request a frame. Only the first
    /// notification after idle does; the rest are coalesced into the pass
    /// already pending. A notification that arrives while a pass runs leaves
    /// the scheduler [`Scheduled`](SchedulerState::Scheduled) once the pass
    /// returns; see [`finish`](Self::finish).
    pub fn notify(&mut self) -> bool {
        match self.state {
            SchedulerState::Idle => {
                self.state = SchedulerState::Scheduled;
                true
            }
            SchedulerState::Scheduled => {
                self.coalesced += 1;
                false
            }
            SchedulerState::Running => {
                self.notified_while_running = true;
                self.coalesced += 1;
                false
            }
        }
    }

    /// Enters the running state.
    ///
    /// Returns `false`, and changes nothing, if a pass is already running.
    /// Callers that cannot hold the scheduler across the pass (it is shared
    /// with the mutation feed) pair this with [`finish`](Self::finish).
    pub fn begin(&mut self) -> bool {
        if self.state == SchedulerState::Running {
            self.refused += 1;
            return false;
        }
        self.state = SchedulerState::Running;
        self.notified_while_running = false;
        true
    }

    /// Leaves the running state.
    ///
    /// Returns `true` when the scheduler was notified during the pass; it is
    /// then [`Scheduled`](SchedulerState::Scheduled) and the caller must
    /// request another frame.
    pub fn finish(&mut self) -> bool {
        if self.state != SchedulerState::Running {
            return false;
        }
        self.passes += 1;
        let again = core::mem::take(&mut self.notified_while_running);
        self.state = if again {
            SchedulerState::Scheduled
        } else {
            SchedulerState::Idle
        };
        again
    }

    /// Runs one pass between [`begin`](Self::begin) and
    /// [`finish`](Self::finish).
    ///
    /// Returns `None` without calling `pass` if a pass is already running.
    pub fn run<R>(&mut self, pass: impl FnOnce() -> R) -> Option<R> {
        if !self.begin() {
            return None;
        }
        let out = pass();
        self.finish();
        Some(out)
    }

    /// Passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Notifications folded into an already pending pass.
    #[must_use]
    pub const fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Re-entrant pass attempts refused.
    #[must_use]
    pub const fn refused(&self) -> u64 {
        self.refused
    }
}

impl Default for ChangeScheduler {
    fn default() -> Self {
        Self::new(SchedulerStrategy::default())
    }
}
