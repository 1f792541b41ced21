//! Human-readable rendering of a counter's filling.

use std::io::{Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::probe::Change;

/* ---------- */

const FILLED: char = '█';
const EMPTY: char = '░';

/// Observer notified by the roles after each completed call.
///
/// Unlike a [`Probe`], a reporter runs once the counter's lock has been released, so it may block
/// (e.g. write to a terminal) without stalling other producers and consumers. The `count` it receives
/// is the value right after the caller's own mutation and may already be outdated.
///
/// `()` is the silent reporter.
///
/// [`Probe`]: crate::Probe
pub trait Reporter: Send + Sync {
    /// Called with the `count` observed right after `change`, and the counter's `capacity`.
    fn report(&self, change: Change, count: usize, capacity: usize);
}

impl Reporter for () {
    #[inline]
    fn report(&self, _: Change, _: usize, _: usize) {}
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    #[inline]
    fn report(&self, change: Change, count: usize, capacity: usize) {
        (**self).report(change, count, capacity)
    }
}

/* ---------- */

/// Renders the producer's and the consumer's view of the counter as two bars.
///
/// The producer bar is filled by the buffered items, the consumer bar by the free slots.
///
/// # Examples
///
/// ```
/// # use bounded_counter::progress::render;
/// assert_eq!(
///     render(2, 5),
///     "Producer: [██░░░] (2/5)   Consumer: [███░░] (3/5)",
/// );
/// ```
pub fn render(count: usize, capacity: usize) -> String {
    let count = count.min(capacity);
    let free = capacity - count;

    format!(
        "Producer: [{}] ({count}/{capacity})   Consumer: [{}] ({free}/{capacity})",
        bar(count, capacity),
        bar(free, capacity),
    )
}

fn bar(filled: usize, width: usize) -> String {
    std::iter::repeat(FILLED)
        .take(filled)
        .chain(std::iter::repeat(EMPTY).take(width - filled))
        .collect()
}

/* ---------- */

/// A [`Reporter`] redrawing the bars of [`render`] in place on a single terminal line.
#[derive(Debug)]
pub struct ProgressBar<W = Stdout> {
    sink: Mutex<W>,
}

impl ProgressBar {
    /// Returns a progress bar drawing on the standard output.
    #[inline]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressBar<W> {
    /// Returns a progress bar drawing on `sink`.
    #[inline]
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Returns the inner sink.
    #[inline]
    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Reporter for ProgressBar<W> {
    fn report(&self, _: Change, count: usize, capacity: usize) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);

        let res = write!(sink, "\r{}", render(count, capacity)).and_then(|_| sink.flush());
        if let Err(err) = res {
            warn!(%err, "failed to draw the progress bar");
        }
    }
}

/* ---------- */
