use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::progress::Reporter;
use crate::settings::Settings;
use crate::worker::{Context, ControlFlow, Worker};
use crate::{BoundedCounter, Change, Error};

/* ---------- */

/// The two roles sharing a [`BoundedCounter`].
///
/// Roles carry no state, all of it lives in the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Adds items, blocking while the counter is full.
    Producer,
    /// Removes items, blocking while the counter is empty.
    Consumer,
}

impl Role {
    /// Performs one call of this role on `counter`, waiting at most `timeout` for a turn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the counter stayed full (or empty) for the whole `timeout`.
    #[inline]
    pub fn act(self, counter: &BoundedCounter, timeout: Duration) -> Result<usize, Error> {
        match self {
            Self::Producer => counter.produce_timeout(timeout),
            Self::Consumer => counter.consume_timeout(timeout),
        }
    }

    /// Returns the change a successful call of this role applies.
    #[inline]
    pub fn change(self) -> Change {
        match self {
            Self::Producer => Change::Produced,
            Self::Consumer => Change::Consumed,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Consumer => f.write_str("consumer"),
        }
    }
}

/* ---------- */

/// A [`Worker`] performing a fixed number of calls of one [`Role`] on a shared counter.
///
/// Before each call the worker sleeps for its pacing delay. Calls are timed with a poll interval:
/// a worker blocked on a full (or empty) counter wakes up every interval so it can notice its
/// runtime stopping. A call that timed out is retried and doesn't count toward the budget.
pub struct RoleWorker {
    role: Role,
    counter: Arc<BoundedCounter>,
    reporter: Arc<dyn Reporter>,
    calls: usize,
    pacing: Duration,
    poll: Duration,
    paced: bool,
}

impl RoleWorker {
    /// Returns the number of calls left to perform.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.calls
    }
}

impl Worker for RoleWorker {
    fn on_start(&mut self) {
        debug!(role = %self.role, calls = self.calls, "role started");
    }

    fn on_update(&mut self) -> ControlFlow {
        if self.calls == 0 {
            debug!(role = %self.role, "role completed");
            return ControlFlow::Break;
        }

        if !self.paced {
            std::thread::sleep(self.pacing);
            self.paced = true;
        }

        match self.role.act(&self.counter, self.poll) {
            Ok(count) => {
                self.calls -= 1;
                self.paced = false;
                self.reporter
                    .report(self.role.change(), count, self.counter.capacity());
            }
            Err(err) => trace!(role = %self.role, %err, "no turn yet, polling again"),
        }

        ControlFlow::Continue
    }
}

/* ---------- */

/// Builds the `nth` [`RoleWorker`] of a role and names its thread after it, e.g. `consumer-2`.
///
/// # Examples
///
/// ```
/// # use bounded_counter::*;
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// let counter = Arc::new(BoundedCounter::new(5).unwrap());
/// let mut runtime = Runtime::new();
///
/// let producer = RoleContext::new(Role::Producer, 0, counter.clone())
///     .calls(3)
///     .pacing(Duration::from_millis(1));
///
/// runtime.launch_from_context(producer).unwrap();
/// runtime.wait();
///
/// assert_eq!(counter.count(), 3);
/// ```
pub struct RoleContext {
    role: Role,
    nth: usize,
    counter: Arc<BoundedCounter>,
    reporter: Arc<dyn Reporter>,
    calls: usize,
    pacing: Duration,
    poll: Duration,
}

impl RoleContext {
    /// Default delay between two attempts of a blocked worker.
    pub const DEFAULT_POLL: Duration = Duration::from_millis(50);

    /// Returns the context of the `nth` worker playing `role` on `counter`.
    ///
    /// It performs a single call, without pacing nor reporting.
    #[inline]
    pub fn new(role: Role, nth: usize, counter: Arc<BoundedCounter>) -> Self {
        Self {
            role,
            nth,
            counter,
            reporter: Arc::new(()),
            calls: 1,
            pacing: Duration::ZERO,
            poll: Self::DEFAULT_POLL,
        }
    }

    /// Sets the number of calls to perform.
    #[inline]
    pub fn calls(mut self, calls: usize) -> Self {
        self.calls = calls;
        self
    }

    /// Sets the delay slept before each call.
    #[inline]
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets how long a call may block before the worker checks whether its runtime is still running.
    #[inline]
    pub fn poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the reporter notified after each call.
    #[inline]
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }
}

impl Context for RoleContext {
    type Target = RoleWorker;

    fn into_worker(self) -> Result<Self::Target, Error> {
        if self.poll.is_zero() {
            return Err(Error::context(format!(
                "{}-{} would spin with a zero poll interval",
                self.role, self.nth
            )));
        }

        Ok(RoleWorker {
            role: self.role,
            counter: self.counter,
            reporter: self.reporter,
            calls: self.calls,
            pacing: self.pacing,
            poll: self.poll,
            paced: false,
        })
    }

    #[inline]
    fn settings(&self) -> Settings {
        Settings::new().name(format!("{}-{}", self.role, self.nth))
    }
}

/* ---------- */
