//! A bounded counter shared by producer and consumer threads.
//!
//! # Philosophy
//!
//! This crate is a small study of the classic bounded-buffer problem. Producers add items to a buffer of
//! fixed capacity, consumers remove them. Producers must wait while the buffer is full, consumers while it
//! is empty. No payload is transferred: the buffer is reduced to the number of items it holds.
//!
//! The whole synchronization protocol lives in [`BoundedCounter`]: one mutex guarding the count and two
//! condition variables, one per direction. Everything else in the crate is plumbing to run threads
//! against a counter and watch it.
//!
//! # Usage
//!
//! A counter is an ordinary value, shared between threads by reference:
//!
//! ```
//! # use bounded_counter::BoundedCounter;
//! # use std::sync::Arc;
//! let counter = Arc::new(BoundedCounter::new(5).unwrap());
//!
//! let consumer = {
//!     let counter = counter.clone();
//!     std::thread::spawn(move || {
//!         for _ in 0..100 {
//!             counter.consume();
//!         }
//!     })
//! };
//!
//! for _ in 0..100 {
//!     counter.produce();
//! }
//!
//! consumer.join().unwrap();
//! assert_eq!(counter.count(), 0);
//! ```
//!
//! # Runs
//!
//! The [`run`] function launches a set of producer and consumer threads described by a [`Config`], waits
//! for all of them and returns a [`Summary`]. Each thread is a [`Worker`] launched in a [`Runtime`],
//! playing one [`Role`] a fixed number of times.
//!
//! ```
//! # use bounded_counter::*;
//! # use std::time::Duration;
//! let config = Config::new()
//!     .capacity(3)
//!     .producers(2, 50)
//!     .consumers(5, 20)
//!     .producer_pacing(Duration::ZERO)
//!     .consumer_pacing(Duration::ZERO);
//!
//! let summary = run(&config, ()).unwrap();
//! assert_eq!(summary.count, 0);
//! ```
//!
//! # Observing a counter
//!
//! Two hooks exist, on both sides of the lock:
//! * a [`Probe`] runs inside each critical section and must never block,
//! * a [`Reporter`] is called by the roles once the lock is released, e.g. [`ProgressBar`] which draws
//!   the counter's filling on the terminal.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events: waits at `debug`, mutations at `trace`. Binaries can call
//! [`trace::init_tracing`] to print them.

#![warn(missing_docs)]

mod counter;
mod driver;
mod error;
mod probe;
pub mod progress;
mod roles;
mod runtime;
mod settings;
#[cfg(test)]
mod test_utils;
pub mod trace;
mod utils;
mod worker;

pub use counter::*;
pub use driver::*;
pub use error::*;
pub use probe::*;
pub use progress::{ProgressBar, Reporter};
pub use roles::*;
pub use runtime::*;
pub use settings::*;
pub use utils::Shutdown;
pub use worker::*;
