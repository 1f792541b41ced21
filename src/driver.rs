use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::progress::Reporter;
use crate::roles::{Role, RoleContext};
use crate::runtime::Runtime;
use crate::{BoundedCounter, Error};

/* ---------- */

/// Describes a run: the counter's capacity and how many producer and consumer threads call it, how often.
///
/// The defaults are one producer and one consumer doing five calls each on a counter of capacity five,
/// the producer pacing its calls every 100ms and the consumer every 150ms.
///
/// # Starvation
///
/// Calls block instead of failing. A configuration where the producers' total doesn't fit between the
/// consumers' total and the consumers' total plus the capacity never completes: some threads block for good.
/// Such configurations are accepted and logged. With [`Config::graceful_shutdown`] enabled they can still be
/// interrupted with `Ctrl+C`.
#[derive(Debug, Clone)]
pub struct Config {
    capacity: usize,
    producers: usize,
    consumers: usize,
    produce_calls: usize,
    consume_calls: usize,
    producer_pacing: Duration,
    consumer_pacing: Duration,
    poll: Duration,
    graceful_shutdown: bool,
}

impl Config {
    /// Returns the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the counter's capacity.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of producer threads and how many calls each one performs.
    #[inline]
    pub fn producers(mut self, threads: usize, calls: usize) -> Self {
        self.producers = threads;
        self.produce_calls = calls;
        self
    }

    /// Sets the number of consumer threads and how many calls each one performs.
    #[inline]
    pub fn consumers(mut self, threads: usize, calls: usize) -> Self {
        self.consumers = threads;
        self.consume_calls = calls;
        self
    }

    /// Sets the delay producers sleep before each call.
    #[inline]
    pub fn producer_pacing(mut self, pacing: Duration) -> Self {
        self.producer_pacing = pacing;
        self
    }

    /// Sets the delay consumers sleep before each call.
    #[inline]
    pub fn consumer_pacing(mut self, pacing: Duration) -> Self {
        self.consumer_pacing = pacing;
        self
    }

    /// Sets how long a blocked call waits before its thread checks whether the run was interrupted.
    #[inline]
    pub fn poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Lets `SIGINT`/`SIGTERM` interrupt the run.
    #[inline]
    pub fn graceful_shutdown(mut self, enabled: bool) -> Self {
        self.graceful_shutdown = enabled;
        self
    }

    /// Total number of items the producers add.
    #[inline]
    pub fn total_produced(&self) -> usize {
        self.producers * self.produce_calls
    }

    /// Total number of items the consumers remove.
    #[inline]
    pub fn total_consumed(&self) -> usize {
        self.consumers * self.consume_calls
    }

    /// Checks the configuration can be run.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroCapacity`] if the capacity is zero.
    /// * [`Error::InvalidConfig`] if the poll interval is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        if self.poll.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }

        Ok(())
    }

    /// Returns whether every call of this configuration can complete.
    pub fn is_balanced(&self) -> bool {
        let produced = self.total_produced();
        let consumed = self.total_consumed();

        consumed <= produced && produced - consumed <= self.capacity
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            capacity: 5,
            producers: 1,
            consumers: 1,
            produce_calls: 5,
            consume_calls: 5,
            producer_pacing: Duration::from_millis(100),
            consumer_pacing: Duration::from_millis(150),
            poll: RoleContext::DEFAULT_POLL,
            graceful_shutdown: false,
        }
    }
}

/* ---------- */

/// What a completed [`run`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Items the producers were configured to add.
    pub produced: usize,
    /// Items the consumers were configured to remove.
    pub consumed: usize,
    /// The counter's value once every thread was joined.
    pub count: usize,
    /// The counter's capacity.
    pub capacity: usize,
    /// Whether the run was interrupted before every call completed.
    pub interrupted: bool,
}

/* ---------- */

/// Runs the producers and consumers described by `config` on a fresh counter, until all of them are done.
///
/// Every thread shares the same counter and `reporter`. The function returns once all threads were joined.
///
/// # Errors
///
/// Returns an error if `config` is invalid or a thread couldn't be spawned. In the latter case the
/// threads already launched are stopped and joined before returning.
///
/// # Examples
///
/// ```
/// # use bounded_counter::*;
/// # use std::time::Duration;
/// let config = Config::new()
///     .capacity(2)
///     .producers(2, 10)
///     .consumers(3, 6)
///     .producer_pacing(Duration::ZERO)
///     .consumer_pacing(Duration::ZERO);
///
/// let summary = run(&config, ()).unwrap();
///
/// assert_eq!(summary.count, 2);
/// ```
pub fn run<R: Reporter + 'static>(config: &Config, reporter: R) -> Result<Summary, Error> {
    config.validate()?;

    if !config.is_balanced() {
        warn!(
            produced = config.total_produced(),
            consumed = config.total_consumed(),
            capacity = config.capacity,
            "unbalanced configuration, some threads will block forever"
        );
    }

    let counter = Arc::new(BoundedCounter::new(config.capacity)?);
    let reporter: Arc<dyn Reporter> = Arc::new(reporter);
    let mut runtime = Runtime::new();

    if config.graceful_shutdown {
        runtime.enable_graceful_shutdown();
    }

    let producers = (0..config.producers).map(|nth| {
        RoleContext::new(Role::Producer, nth, counter.clone())
            .calls(config.produce_calls)
            .pacing(config.producer_pacing)
    });

    let consumers = (0..config.consumers).map(|nth| {
        RoleContext::new(Role::Consumer, nth, counter.clone())
            .calls(config.consume_calls)
            .pacing(config.consumer_pacing)
    });

    info!(
        capacity = config.capacity,
        producers = config.producers,
        consumers = config.consumers,
        "starting"
    );

    for ctx in producers.chain(consumers) {
        let ctx = ctx.poll(config.poll).reporter(reporter.clone());
        runtime.launch_from_context(ctx)?;
    }

    runtime.wait();

    let summary = Summary {
        produced: config.total_produced(),
        consumed: config.total_consumed(),
        count: counter.count(),
        capacity: counter.capacity(),
        interrupted: !runtime.is_running(),
    };

    info!(count = summary.count, interrupted = summary.interrupted, "all roles joined");
    Ok(summary)
}

/* ---------- */
