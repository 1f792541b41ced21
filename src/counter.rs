use std::fmt::{Debug, Formatter};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::probe::{Change, Probe};
use crate::Error;

/* ---------- */

/// A counter of buffered items bounded by a fixed capacity and shared between producer and consumer threads.
///
/// Only the number of buffered items is tracked, no payload is ever transferred. One [`Mutex`] guards the count,
/// two [`Condvar`]s park the callers that can't make progress:
/// * producers wait on `space_available` while the counter is full,
/// * consumers wait on `item_available` while it is empty.
///
/// Every mutation signals exactly one waiter on the opposite condition. A counter only moves by one unit per call,
/// so one freed slot (or one new item) can satisfy at most one waiter and waking more would be wasted work.
/// Woken callers always re-check their condition in a loop before mutating: another caller may have taken the
/// slot between the signal and the wakeup, and the platform is allowed to wake a waiter spuriously.
///
/// The counter is meant to be shared by reference, typically behind an [`Arc`].
///
/// # Starvation
///
/// Calls never fail, they block. A counter that is full and has no live consumer (or empty with no live producer)
/// blocks its callers forever. The timed variants, [`BoundedCounter::produce_timeout`] and
/// [`BoundedCounter::consume_timeout`], let callers give up instead.
///
/// # Examples
///
/// ```
/// # use bounded_counter::*;
/// # use std::sync::Arc;
/// let counter = Arc::new(BoundedCounter::new(2).unwrap());
///
/// let producer = {
///     let counter = counter.clone();
///     std::thread::spawn(move || {
///         for _ in 0..10 {
///             counter.produce();
///         }
///     })
/// };
///
/// for _ in 0..10 {
///     counter.consume();
/// }
///
/// producer.join().unwrap();
/// assert_eq!(counter.count(), 0);
/// ```
///
/// [`Arc`]: std::sync::Arc
pub struct BoundedCounter {
    count: Mutex<usize>,
    capacity: usize,
    space_available: Condvar,
    item_available: Condvar,
    probe: Box<dyn Probe>,
}

impl BoundedCounter {
    /// Returns an empty counter able to hold `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    #[inline]
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::with_probe(capacity, ())
    }

    /// Returns an empty counter able to hold `capacity` items, calling `probe` inside each critical section.
    ///
    /// See [`Probe`] for the constraints a probe must respect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    pub fn with_probe<P: Probe + 'static>(capacity: usize, probe: P) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            count: Mutex::new(0),
            capacity,
            space_available: Condvar::new(),
            item_available: Condvar::new(),
            probe: Box::new(probe),
        })
    }

    /// Returns the maximum number of items the counter can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items currently buffered.
    ///
    /// The value is read under the lock but may be stale as soon as this function returns.
    #[inline]
    pub fn count(&self) -> usize {
        *self.lock()
    }

    /// Adds one item, blocking while the counter is full.
    ///
    /// Wakes up at most one consumer waiting for an item and returns the count right after the increment.
    pub fn produce(&self) -> usize {
        let mut count = self.lock();

        while *count == self.capacity {
            debug!(capacity = self.capacity, "buffer full, producer waiting");
            count = self
                .space_available
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }

        self.commit(count, Change::Produced)
    }

    /// Removes one item, blocking while the counter is empty.
    ///
    /// Wakes up at most one producer waiting for space and returns the count right after the decrement.
    pub fn consume(&self) -> usize {
        let mut count = self.lock();

        while *count == 0 {
            debug!(capacity = self.capacity, "buffer empty, consumer waiting");
            count = self
                .item_available
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }

        self.commit(count, Change::Consumed)
    }

    /// Same as [`BoundedCounter::produce`] but gives up once `timeout` elapsed without space being available.
    ///
    /// A zero `timeout` never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the counter stayed full. The count is left untouched.
    #[inline]
    pub fn produce_timeout(&self, timeout: Duration) -> Result<usize, Error> {
        let count = self.wait_timeout(Change::Produced, timeout)?;
        Ok(self.commit(count, Change::Produced))
    }

    /// Same as [`BoundedCounter::consume`] but gives up once `timeout` elapsed without an item being available.
    ///
    /// A zero `timeout` never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the counter stayed empty. The count is left untouched.
    #[inline]
    pub fn consume_timeout(&self, timeout: Duration) -> Result<usize, Error> {
        let count = self.wait_timeout(Change::Consumed, timeout)?;
        Ok(self.commit(count, Change::Consumed))
    }

    // A panic can't happen between reading and writing the count, so the count
    // is always within bounds and a poisoned lock is safe to recover.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn is_blocked(&self, change: Change, count: usize) -> bool {
        match change {
            Change::Produced => count == self.capacity,
            Change::Consumed => count == 0,
        }
    }

    fn wait_timeout(&self, change: Change, timeout: Duration) -> Result<MutexGuard<'_, usize>, Error> {
        let deadline = Instant::now().checked_add(timeout);
        let cond = match change {
            Change::Produced => &self.space_available,
            Change::Consumed => &self.item_available,
        };

        let mut count = self.lock();

        while self.is_blocked(change, *count) {
            // Too far in the future to be represented, the wait is unbounded.
            let Some(deadline) = deadline else {
                count = cond.wait(count).unwrap_or_else(PoisonError::into_inner);
                continue;
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout(timeout));
            }

            debug!(capacity = self.capacity, ?change, ?remaining, "waiting for a turn");
            count = cond
                .wait_timeout(count, remaining)
                .map_or_else(|poisoned| poisoned.into_inner().0, |(guard, _)| guard);
        }

        Ok(count)
    }

    /// Applies `change` and signals the opposite condition, the lock is released when `count` drops.
    fn commit(&self, mut count: MutexGuard<'_, usize>, change: Change) -> usize {
        match change {
            Change::Produced => *count += 1,
            Change::Consumed => *count -= 1,
        }

        // Signal before anything that may panic, a waiter must never miss a change.
        match change {
            Change::Produced => self.item_available.notify_one(),
            Change::Consumed => self.space_available.notify_one(),
        }

        let value = *count;
        trace!(?change, count = value, capacity = self.capacity);
        self.probe.on_change(change, value, self.capacity);

        value
    }
}

impl Debug for BoundedCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCounter")
            .field("count", &self.count())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    use super::*;
    use crate::test_utils::*;

    const LIVENESS: Duration = Duration::from_secs(10);

    #[test]
    fn zero_capacity() {
        let err = BoundedCounter::new(0).expect_err("a zero capacity should be rejected");
        assert!(matches!(err, Error::ZeroCapacity));
    }

    #[test]
    fn fills_up_to_capacity() {
        let counter = BoundedCounter::new(5).unwrap();

        for expected in 1..=5 {
            assert_eq!(counter.produce(), expected);
        }

        assert_eq!(counter.count(), 5);

        let err = counter
            .produce_timeout(Duration::from_millis(50))
            .expect_err("a full counter should not accept a sixth item");
        assert!(err.is_timeout());
        assert_eq!(counter.count(), 5);
    }

    #[test]
    fn empty_consume_times_out() {
        let counter = BoundedCounter::new(5).unwrap();

        let err = counter
            .consume_timeout(Duration::ZERO)
            .expect_err("an empty counter has nothing to consume");
        assert!(err.is_timeout());
        assert_eq!(counter.count(), 0);

        assert_eq!(counter.produce_timeout(Duration::ZERO).unwrap(), 1);
        assert_eq!(counter.consume_timeout(Duration::ZERO).unwrap(), 0);
    }

    #[test]
    fn blocked_producer_resumes_after_consume() {
        let counter = Arc::new(BoundedCounter::new(5).unwrap());
        for _ in 0..5 {
            counter.produce();
        }

        let (tx, rx) = unbounded();
        let handle = {
            let counter = counter.clone();
            std::thread::spawn(move || tx.send(counter.produce()).unwrap())
        };

        assert!(
            rx.recv_timeout(Duration::from_millis(100)).is_err(),
            "the sixth produce should block on a full counter"
        );

        assert_eq!(counter.consume(), 4);
        assert_eq!(rx.recv_timeout(LIVENESS), Ok(5));
        assert_eq!(counter.count(), 5);

        handle.join().unwrap();
    }

    #[test]
    fn blocked_consumer_resumes_after_produce() {
        let counter = Arc::new(BoundedCounter::new(5).unwrap());

        let (tx, rx) = unbounded();
        let handle = {
            let counter = counter.clone();
            std::thread::spawn(move || tx.send(counter.consume()).unwrap())
        };

        assert!(
            rx.recv_timeout(Duration::from_millis(100)).is_err(),
            "consuming an empty counter should block"
        );

        assert_eq!(counter.produce(), 1);
        assert_eq!(rx.recv_timeout(LIVENESS), Ok(0));
        assert_eq!(counter.count(), 0);

        handle.join().unwrap();
    }

    #[test]
    fn timed_producer_resumes_after_consume() {
        let counter = Arc::new(BoundedCounter::new(1).unwrap());
        counter.produce();

        let handle = {
            let counter = counter.clone();
            std::thread::spawn(move || counter.produce_timeout(LIVENESS))
        };

        std::thread::sleep(Duration::from_millis(50));
        counter.consume();

        let count = handle
            .join()
            .unwrap()
            .expect("the timed produce should complete before its deadline");
        assert_eq!(count, 1);
    }

    #[test]
    fn capacity_one_alternates() {
        let (probe, samples) = Sampler::new();
        let counter = Arc::new(BoundedCounter::with_probe(1, probe).unwrap());
        let calls = 200;

        let done = spawn_roles(&counter, 1, calls, 1, calls);
        wait_all(&done, 2, LIVENESS);

        let samples = samples.try_iter().collect::<Vec<_>>();
        assert_eq!(samples.len(), calls * 2);

        for (nth, pair) in samples.chunks(2).enumerate() {
            assert_eq!(
                pair,
                [(Change::Produced, 1), (Change::Consumed, 0)],
                "pair #{nth} didn't alternate"
            );
        }
    }

    #[test]
    fn single_producer_single_consumer() {
        let (probe, samples) = Sampler::new();
        let counter = Arc::new(BoundedCounter::with_probe(5, probe).unwrap());

        let done = spawn_roles(&counter, 1, 5, 1, 5);
        wait_all(&done, 2, LIVENESS);

        assert_eq!(counter.count(), 0);

        let samples = samples.try_iter().collect::<Vec<_>>();
        assert_eq!(samples.len(), 10);
        assert!(samples.iter().all(|(_, count)| *count <= 5));
    }

    #[test]
    fn no_lost_update() {
        let (probe, samples) = Sampler::new();
        let counter = Arc::new(BoundedCounter::with_probe(8, probe).unwrap());

        // 4 * 250 produced, 4 * 249 consumed.
        let done = spawn_roles(&counter, 4, 250, 4, 249);
        wait_all(&done, 8, LIVENESS);

        assert_eq!(counter.count(), 4);

        let mut expected = 0isize;
        for (change, count) in samples.try_iter() {
            match change {
                Change::Produced => expected += 1,
                Change::Consumed => expected -= 1,
            }

            assert_eq!(count as isize, expected, "samples are taken under the lock");
            assert!(count <= 8);
        }

        assert_eq!(expected, 4);
    }

    #[test]
    fn mutual_exclusion() {
        let probe = Arc::new(ExclusionProbe::default());
        let counter = Arc::new(BoundedCounter::with_probe(3, probe.clone()).unwrap());

        let done = spawn_roles(&counter, 3, 100, 3, 100);
        wait_all(&done, 6, LIVENESS);

        assert_eq!(probe.entries(), 600);
        assert_eq!(probe.overlaps(), 0, "critical sections overlapped");
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn recovers_from_poisoning() {
        struct PanickingProbe;
        impl Probe for PanickingProbe {
            fn on_change(&self, change: Change, _: usize, _: usize) {
                if change == Change::Consumed {
                    panic!("probe panicked");
                }
            }
        }

        let counter = Arc::new(BoundedCounter::with_probe(1, PanickingProbe).unwrap());
        counter.produce();

        // A producer parked on the full counter.
        let (tx, rx) = unbounded();
        let handle = {
            let counter = counter.clone();
            std::thread::spawn(move || tx.send(counter.produce()).unwrap())
        };

        assert!(
            rx.recv_timeout(Duration::from_millis(100)).is_err(),
            "the producer should block on a full counter"
        );

        let poisoner = counter.clone();
        let res = std::thread::spawn(move || poisoner.consume()).join();
        assert!(res.is_err());

        assert_eq!(
            rx.recv_timeout(LIVENESS),
            Ok(1),
            "the parked producer should be woken despite the panic"
        );
        handle.join().unwrap();

        assert_eq!(counter.count(), 1);
        assert_eq!(counter.consume_timeout(Duration::ZERO).unwrap(), 0);
    }
}
