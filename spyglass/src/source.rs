use std::{fmt, sync::Arc};

use tokio::{runtime::Handle, select, sync::watch};
use tokio_util::sync::CancellationToken;

use crate::{Error, Result, Subscriber};

/// Producing end of the producer contract: anything a subscriber can be attached to.
///
/// A source registers the subscriber and then calls
/// [`Subscriber::on_value`] zero or more times. It may replay its most recent
/// value synchronously inside [`subscribe`](Self::subscribe); observers record
/// whatever they are handed.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use spyglass::{Result, Source, Subscriber, Subscription};
///
/// #[derive(Default)]
/// struct Emitter {
///     subscribers: Mutex<Vec<Arc<dyn Subscriber<u32>>>>,
/// }
///
/// impl Emitter {
///     fn emit(&self, value: u32) {
///         for s in self.subscribers.lock().unwrap().iter() {
///             s.on_value(value);
///         }
///     }
/// }
///
/// impl Source<u32> for Emitter {
///     fn subscribe(&self, subscriber: Arc<dyn Subscriber<u32>>) -> Result<Subscription> {
///         self.subscribers.lock().unwrap().push(subscriber);
///         Ok(Subscription::detached())
///     }
/// }
/// ```
pub trait Source<T> {
    /// Register `subscriber` for every value emitted from now on.
    ///
    /// # Errors
    ///
    /// Implementation specific; see [`Error::RuntimeUnavailable`] and
    /// [`Error::SourceClosed`] for the `watch::Receiver` implementation.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Result<Subscription>;
}

/// Handle to an active subscription.
///
/// [`cancel`](Self::cancel) stops further deliveries and is idempotent.
/// Dropping the handle detaches it without cancelling, the same way dropping a
/// Tokio `JoinHandle` leaves the task running.
pub struct Subscription {
    token: Option<CancellationToken>,
}

impl Subscription {
    /// Wrap a token that the source watches to stop delivering.
    pub fn new(token: CancellationToken) -> Self {
        Self { token: Some(token) }
    }

    /// A handle for sources that cannot be cancelled.
    pub fn detached() -> Self {
        Self { token: None }
    }

    /// Stop further deliveries. Calling it again has no effect.
    pub fn cancel(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    ///
    /// Always `false` for a [`detached`](Self::detached) handle.
    pub fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancellable", &self.token.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// A `watch` channel behaves like a value holder with replay-on-subscribe:
/// the current value is delivered synchronously during `subscribe`, then each
/// change is forwarded from a spawned task.
///
/// `watch` keeps only the latest value, so changes made faster than the
/// forwarding task runs are coalesced.
///
/// # Errors
///
/// Returns [`Error::RuntimeUnavailable`] when called outside a Tokio runtime
/// and [`Error::SourceClosed`] when the sender has already been dropped.
impl<T> Source<T> for watch::Receiver<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Result<Subscription> {
        let handle = Handle::try_current().map_err(|_| Error::RuntimeUnavailable)?;
        let mut receiver = self.clone();
        if receiver.has_changed().is_err() {
            return Err(Error::SourceClosed);
        }

        let current = receiver.borrow_and_update().clone();
        subscriber.on_value(current);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        handle.spawn(async move {
            loop {
                select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    changed = receiver.changed() => {
                        if changed.is_err() {
                            tracing::trace!("watch sender dropped, forwarding stopped");
                            break;
                        }
                        let value = receiver.borrow_and_update().clone();
                        subscriber.on_value(value);
                    }
                }
            }
        });

        Ok(Subscription::new(token))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use super::*;

    fn collector() -> (Arc<Mutex<Vec<u32>>>, Arc<dyn Subscriber<u32>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscriber: Arc<dyn Subscriber<u32>> =
            Arc::new(move |v: u32| sink.lock().unwrap().push(v));
        (seen, subscriber)
    }

    async fn wait_for_len(seen: &Mutex<Vec<u32>>, len: usize) {
        for _ in 0..200 {
            if seen.lock().unwrap().len() >= len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn detached_subscription_never_reports_cancelled() {
        let sub = Subscription::detached();
        sub.cancel();
        assert!(!sub.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let sub = Subscription::new(CancellationToken::new());
        sub.cancel();
        sub.cancel();
        assert!(sub.is_cancelled());
    }

    #[test]
    fn watch_requires_runtime() {
        let (_tx, rx) = watch::channel(1u32);
        let (_, subscriber) = collector();
        assert_eq!(rx.subscribe(subscriber).unwrap_err(), Error::RuntimeUnavailable);
    }

    #[tokio::test]
    async fn watch_replays_current_value_synchronously() {
        let (_tx, rx) = watch::channel(7u32);
        let (seen, subscriber) = collector();
        let _sub = rx.subscribe(subscriber).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn watch_forwards_changes_until_cancelled() {
        let (tx, rx) = watch::channel(0u32);
        let (seen, subscriber) = collector();
        let sub = rx.subscribe(subscriber).unwrap();

        tx.send(1).unwrap();
        wait_for_len(&seen, 2).await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);

        sub.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(2).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn watch_closed_sender_is_rejected() {
        let (tx, rx) = watch::channel(0u32);
        drop(tx);
        let (seen, subscriber) = collector();
        assert_eq!(rx.subscribe(subscriber).unwrap_err(), Error::SourceClosed);
        assert!(seen.lock().unwrap().is_empty());
    }
}
