/// Receiving end of the producer contract.
///
/// A producer holds one or more subscribers and calls
/// [`on_value`](Self::on_value) zero or more times, possibly from a
/// background thread or task. Implementations must tolerate being called from
/// a thread other than the one that created them.
///
/// [`RecordingObserver`](crate::RecordingObserver) and
/// [`Tracer`](crate::Tracer) are the two implementations shipped here.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use spyglass::Subscriber;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl Subscriber<u32> for Counter {
///     fn on_value(&self, _value: u32) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Subscriber<T>: Send + Sync {
    /// Called once for every value the producer emits.
    fn on_value(&self, value: T);
}

impl<T, F> Subscriber<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn on_value(&self, value: T) {
        self(value)
    }
}
