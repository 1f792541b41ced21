use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use tracing::warn;

use crate::settings::Settings;
use crate::worker::Worker;
use crate::Error;

/* ---------- */

/// Lets a `SIGINT`/`SIGTERM` stop the runtime owning `shutdown`.
///
/// The first signal only raises the flag. If the runtime doesn't stop,
/// a second signal kills the process.
pub(crate) fn enable_graceful_shutdown(shutdown: &Shutdown) {
    for sig in TERM_SIGNALS {
        let flag = shutdown.as_ref();

        if let Err(err) = flag::register_conditional_shutdown(*sig, 1, flag.clone()) {
            warn!(signal = *sig, %err, "failed to register the forced shutdown handler");
        }

        if let Err(err) = flag::register(*sig, flag.clone()) {
            warn!(signal = *sig, %err, "failed to register the graceful shutdown handler");
        }
    }
}

/// Spawns `worker` on a thread configured with `settings`.
pub(crate) fn spawn_thread<W>(
    mut worker: W,
    settings: Settings,
    shutdown: &Shutdown,
) -> Result<JoinHandle<()>, Error>
where
    W: Worker + 'static,
{
    let shutdown = shutdown.clone();
    let handle = settings
        .into_builder()
        .spawn(move || worker.run(shutdown))?;

    Ok(handle)
}

/* ---------- */

/// Describes the running status of a [`Runtime`].
///
/// Workers receive a clone in [`Worker::run`] and are expected to leave their loop
/// once [`Shutdown::is_running`] returns `false`.
///
/// [`Runtime`]: crate::Runtime
#[derive(Debug, Default, Clone)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    #[inline]
    pub(crate) fn stop(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Returns whether or not the [`Runtime`] is running.
    ///
    /// [`Runtime`]: crate::Runtime
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

impl AsRef<Arc<AtomicBool>> for Shutdown {
    #[inline]
    fn as_ref(&self) -> &Arc<AtomicBool> {
        &self.0
    }
}
