use std::fmt;

use crate::Subscriber;

/// A subscriber that logs every value to the `tracing` crate at `debug` level.
///
/// Attach it next to a [`RecordingObserver`](crate::RecordingObserver) to see
/// what a source emits while a test runs.
///
/// # Example
///
/// ```ignore
/// use spyglass::{Source, Tracer};
///
/// let _sub = source.subscribe(Arc::new(Tracer::new("temperature")))?;
/// ```
#[derive(Debug, Clone)]
pub struct Tracer {
    name: String,
}

impl Tracer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: fmt::Debug> Subscriber<T> for Tracer {
    fn on_value(&self, value: T) {
        tracing::debug!(source = %self.name, value = ?value, "value emitted");
    }
}
