use std::time::Duration;

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A counter can't be built with a capacity of zero, producers would never be able to produce.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// A driver configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker couldn't be built from its context.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// A timed produce or consume didn't get its turn before the deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The OS refused to spawn a worker thread.
    #[error(transparent)]
    ThreadStart(#[from] std::io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn context<T: ToString>(msg: T) -> Self {
        Self::InvalidContext(msg.to_string())
    }

    #[inline]
    pub(crate) fn config<T: ToString>(msg: T) -> Self {
        Self::InvalidConfig(msg.to_string())
    }

    /// Returns whether this error is a [`Error::Timeout`].
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
