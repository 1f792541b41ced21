use std::thread::JoinHandle;

use tracing::{debug, error};

use crate::settings::Settings;
use crate::utils::Shutdown;
use crate::worker::{Context, Worker};
use crate::Error;

/* ---------- */

/// A runtime that manages [`Workers`] threads.
///
/// When dropped, a runtime stops and waits for all the workers to complete.
///
/// [`Workers`]: crate::Worker
#[derive(Debug, Default)]
pub struct Runtime {
    shutdown: Shutdown,
    threads: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Returns a new runtime.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables this runtime to be gracefully shutdown with a `Ctrl+C` signal.
    ///
    /// If the gracefull shutdown doesn't have any effects, users can still
    /// send a second `Ctrl+C` signal to forcefully kill the runtime.
    #[inline]
    pub fn enable_graceful_shutdown(&self) {
        crate::utils::enable_graceful_shutdown(&self.shutdown)
    }

    /// Asks every worker to leave its loop.
    ///
    /// Workers only notice it between two [`Worker::on_update`] calls.
    #[inline]
    pub fn stop(&self) {
        self.shutdown.stop()
    }

    /// Returns whether the runtime was neither stopped nor interrupted by a signal.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Runs a [`Worker`] in a new thread.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the runtime is stopped.
    #[inline]
    pub fn launch<W: Worker + 'static>(&mut self, worker: W) -> Result<(), Error> {
        self.launch_with_settings(worker, Settings::default())
    }

    /// Runs a [`Worker`] in a new thread configured with `settings`.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the runtime is stopped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bounded_counter::*;
    /// struct Idle;
    /// impl Worker for Idle {}
    ///
    /// let mut runtime = Runtime::new();
    /// let settings = Settings::new().name("idle");
    ///
    /// runtime.launch_with_settings(Idle, settings).unwrap();
    /// runtime.wait();
    /// ```
    pub fn launch_with_settings<W: Worker + 'static>(
        &mut self,
        worker: W,
        settings: Settings,
    ) -> Result<(), Error> {
        let name = settings.thread_name().map(str::to_owned);

        let thread = crate::utils::spawn_thread(worker, settings, &self.shutdown)
            .inspect_err(|err| {
                error!(thread = ?name, %err, "failed to launch a worker");
                self.shutdown.stop()
            })?;

        debug!(thread = ?name, "worker launched");
        self.threads.push(thread);
        Ok(())
    }

    /// Runs a [`Worker`] built from a [`Context`] in a new thread.
    ///
    /// The new thread will be configured using the values returned by the [`Context::settings`] function.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the runtime is stopped.
    #[inline]
    pub fn launch_from_context<W, C>(&mut self, ctx: C) -> Result<(), Error>
    where
        W: Worker + 'static,
        C: Context<Target = W>,
    {
        let settings = ctx.settings();
        let worker = ctx.into_worker().inspect_err(|_| self.shutdown.stop())?;

        self.launch_with_settings(worker, settings)
    }

    /// Blocks the calling thread until all the runtime's workers stop.
    ///
    /// Workers that panicked are logged and otherwise ignored.
    pub fn wait(&mut self) {
        for thread in self.threads.drain(..) {
            let name = thread.thread().name().map(str::to_owned);

            if thread.join().is_err() {
                error!(thread = ?name, "worker panicked");
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown.stop();
        self.wait()
    }
}

/* ---------- */
