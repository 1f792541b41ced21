use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{BoundedCounter, Change, Context, ControlFlow, Error, Probe, Worker};

/* ---------- */

pub(crate) struct TestWorker;

impl Worker for TestWorker {
    fn on_update(&mut self) -> ControlFlow {
        std::thread::sleep(Duration::from_millis(1));
        ControlFlow::Continue
    }
}

/* ---------- */

pub(crate) struct TestTimedWorker {
    timeout: Duration,
    now: Instant,
}

impl TestTimedWorker {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            now: Instant::now(),
        }
    }
}

impl Worker for TestTimedWorker {
    fn on_start(&mut self) {
        self.now = Instant::now();
    }

    fn on_update(&mut self) -> ControlFlow {
        if self.now.elapsed() >= self.timeout {
            return ControlFlow::Break;
        }

        ControlFlow::Continue
    }
}

/* ---------- */

pub(crate) struct BadWorker;

impl Worker for BadWorker {
    fn on_update(&mut self) -> ControlFlow {
        std::thread::sleep(Duration::from_millis(500));
        ControlFlow::Break
    }
}

pub(crate) struct BadWorkerContext;

impl Context for BadWorkerContext {
    type Target = BadWorker;

    fn into_worker(self) -> Result<Self::Target, Error> {
        Err(Error::context("bad context"))
    }
}

/* ---------- */

/// Forwards every mutation to a channel, in lock order.
pub(crate) struct Sampler(Sender<(Change, usize)>);

impl Sampler {
    pub(crate) fn new() -> (Self, Receiver<(Change, usize)>) {
        let (tx, rx) = unbounded();
        (Self(tx), rx)
    }
}

impl Probe for Sampler {
    fn on_change(&self, change: Change, count: usize, capacity: usize) {
        assert!(count <= capacity, "count {count} over capacity {capacity}");
        let _ = self.0.send((change, count));
    }
}

/* ---------- */

/// Counts how many times two critical sections were seen running at the same time.
#[derive(Debug, Default)]
pub(crate) struct ExclusionProbe {
    inside: AtomicUsize,
    entries: AtomicUsize,
    overlaps: AtomicUsize,
}

impl ExclusionProbe {
    pub(crate) fn entries(&self) -> usize {
        self.entries.load(Ordering::SeqCst)
    }

    pub(crate) fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

impl Probe for ExclusionProbe {
    fn on_change(&self, _: Change, _: usize, _: usize) {
        if self.inside.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        // Widen the window a concurrent entry would need to hit.
        for _ in 0..64 {
            std::hint::spin_loop();
        }

        self.entries.fetch_add(1, Ordering::SeqCst);
        self.inside.fetch_sub(1, Ordering::SeqCst);
    }
}

/* ---------- */

/// Spawns detached producer and consumer threads, each one reporting on the returned channel once done.
pub(crate) fn spawn_roles(
    counter: &Arc<BoundedCounter>,
    producers: usize,
    produce_calls: usize,
    consumers: usize,
    consume_calls: usize,
) -> Receiver<()> {
    let (tx, rx) = unbounded();

    let roles = std::iter::repeat((true, produce_calls))
        .take(producers)
        .chain(std::iter::repeat((false, consume_calls)).take(consumers));

    for (produce, calls) in roles {
        let counter = counter.clone();
        let tx = tx.clone();

        std::thread::spawn(move || {
            for _ in 0..calls {
                if produce {
                    counter.produce();
                } else {
                    counter.consume();
                }
            }

            let _ = tx.send(());
        });
    }

    rx
}

/// Panics unless `n` completions are received before `timeout`.
pub(crate) fn wait_all(done: &Receiver<()>, n: usize, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    for nth in 0..n {
        let remaining = deadline.saturating_duration_since(Instant::now());
        done.recv_timeout(remaining)
            .unwrap_or_else(|_| panic!("only {nth} of {n} threads completed within {timeout:?}"));
    }
}
