use std::thread::Builder;

/* ---------- */

/// Used to configure the thread a worker is launched on.
///
/// # Examples
///
/// ```
/// # use bounded_counter::*;
/// let settings = Settings::new().name("consumer-3").stack_size(256 * 1024);
///
/// assert_eq!(settings.thread_name(), Some("consumer-3"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Settings {
    name: Option<String>,
    stack_size: Option<usize>,
}

impl Settings {
    /// Returns the base [`Settings`]: an unnamed thread with the platform's default stack size.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the thread's name.
    ///
    /// The name must not contains null bytes (`\0`).
    #[inline]
    pub fn name<T: ToString>(mut self, name: T) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the thread's stack size.
    ///
    /// The actual stack size may be greater than this value if the platform specifies a minimal stack size.
    #[inline]
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Returns the thread's name, if any.
    #[inline]
    pub fn thread_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Turns the settings into a [`std::thread::Builder`].
    pub(crate) fn into_builder(self) -> Builder {
        let mut builder = Builder::new();

        if let Some(name) = self.name {
            builder = builder.name(name);
        }

        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        builder
    }
}

/* ---------- */
