use crate::settings::Settings;
use crate::utils::Shutdown;
use crate::Error;

/* ---------- */

/// A worker is the body of a thread launched in a [`Runtime`].
///
/// Workers are defined by one main method, [`Worker::run`], which runs the actual loop. This method
/// has a default implementation that first calls the [`Worker::on_start`] method once at the beginning, then calls
/// [`Worker::on_update`] in the loop until it returns [`ControlFlow::Break`] or the runtime is stopped.
///
/// The roles sharing a [`BoundedCounter`] are workers, see [`RoleWorker`].
///
/// [`Runtime`]: crate::Runtime
/// [`BoundedCounter`]: crate::BoundedCounter
/// [`RoleWorker`]: crate::RoleWorker
///
/// # Examples
///
/// A worker that consumes ten items then stops:
///
/// ```
/// # use bounded_counter::*;
/// # use std::sync::Arc;
/// struct TenConsumes {
///     counter: Arc<BoundedCounter>,
///     left: usize,
/// }
///
/// impl Worker for TenConsumes {
///     fn on_update(&mut self) -> ControlFlow {
///         if self.left == 0 {
///             return ControlFlow::Break;
///         }
///
///         self.counter.consume();
///         self.left -= 1;
///         ControlFlow::Continue
///     }
/// }
///
/// let counter = Arc::new(BoundedCounter::new(10).unwrap());
/// for _ in 0..10 {
///     counter.produce();
/// }
///
/// let mut runtime = Runtime::new();
/// runtime.launch(TenConsumes { counter: counter.clone(), left: 10 }).unwrap();
/// runtime.wait();
///
/// assert_eq!(counter.count(), 0);
/// ```
pub trait Worker: Send {
    /// Convenient method to print or set stuff up before entering the worker loop.
    ///
    /// The first method to be called by the [`Worker::run`] default implementation.
    /// By default, this does nothing.
    #[inline]
    fn on_start(&mut self) {}

    /// Convenient method to do work on each iteration of the worker loop.
    ///
    /// Called in a loop by the [`Worker::run`] default implementation, until either
    /// [`ControlFlow::Break`] is returned or the runtime in which the worker runs is stopped.
    /// By default, this method just returns [`ControlFlow::Break`].
    #[inline]
    fn on_update(&mut self) -> ControlFlow {
        ControlFlow::Break
    }

    /// Main worker loop spawned in a new thread by the runtime.
    ///
    /// By default, this first calls [`Worker::on_start`] then [`Worker::on_update`] in a loop that spins until [`shutdown.is_running()`]
    /// returns `false`.
    ///
    /// [`shutdown.is_running()`]: crate::Shutdown::is_running
    #[inline]
    fn run(&mut self, shutdown: Shutdown) {
        self.on_start();

        while shutdown.is_running() {
            if let ControlFlow::Break = self.on_update() {
                break;
            }
        }
    }
}

/* ---------- */

/// Allow building a worker before actually launching it with the [`Runtime::launch_from_context`] function.
///
/// The driver uses contexts to turn its configuration into named producer and consumer threads,
/// see [`RoleContext`].
///
/// [`Runtime::launch_from_context`]: crate::Runtime::launch_from_context
/// [`RoleContext`]: crate::RoleContext
pub trait Context {
    /// The type of [`Worker`] built from this context.
    type Target: Worker;

    /// Consumes `self` to build the targeted [`Worker`] from the context.
    fn into_worker(self) -> Result<Self::Target, Error>;

    /// Returns some [`Settings`] used to configure the worker's thread.
    ///
    /// By default, it returns default thread settings.
    #[inline]
    fn settings(&self) -> Settings {
        Settings::default()
    }
}

/* ---------- */

/// Defines the control flow of [`Workers`].
///
/// [`Workers`]: crate::Worker
#[derive(Debug, PartialEq)]
pub enum ControlFlow {
    /// Tells the runtime to continue the main worker loop.
    Continue,
    /// Tells the runtime to break the main worker loop.
    Break,
}
