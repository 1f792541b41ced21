use std::sync::Arc;

/* ---------- */

/// The mutation a [`BoundedCounter`] just went through.
///
/// [`BoundedCounter`]: crate::BoundedCounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// One item was added by a producer.
    Produced,
    /// One item was removed by a consumer.
    Consumed,
}

/* ---------- */

/// Instrumentation hook running inside a [`BoundedCounter`] critical section.
///
/// [`Probe::on_change`] is called with the counter's lock held, right after `count` was mutated and the
/// opposite condition signaled. A waiter woken by that signal only resumes once the lock is released.
/// Every other producer and consumer is stalled while it runs, so implementations must never block:
/// no I/O, no locks that could be held by a counter caller.
///
/// `()` is the no-op probe.
///
/// # Examples
///
/// A probe that remembers the highest count ever observed:
///
/// ```
/// # use bounded_counter::*;
/// # use std::sync::atomic::{AtomicUsize, Ordering};
/// # use std::sync::Arc;
/// #[derive(Default)]
/// struct HighWater(AtomicUsize);
///
/// impl Probe for HighWater {
///     fn on_change(&self, _: Change, count: usize, _: usize) {
///         self.0.fetch_max(count, Ordering::Relaxed);
///     }
/// }
///
/// let probe = Arc::new(HighWater::default());
/// let counter = BoundedCounter::with_probe(3, probe.clone()).unwrap();
///
/// counter.produce();
/// counter.produce();
/// counter.consume();
///
/// assert_eq!(probe.0.load(Ordering::Relaxed), 2);
/// ```
///
/// [`BoundedCounter`]: crate::BoundedCounter
pub trait Probe: Send + Sync {
    /// Called after each mutation with the new `count` and the counter's `capacity`.
    fn on_change(&self, change: Change, count: usize, capacity: usize);
}

impl Probe for () {
    #[inline]
    fn on_change(&self, _: Change, _: usize, _: usize) {}
}

impl<P: Probe + ?Sized> Probe for Arc<P> {
    #[inline]
    fn on_change(&self, change: Change, count: usize, capacity: usize) {
        (**self).on_change(change, count, capacity)
    }
}
