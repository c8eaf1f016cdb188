use std::{
    fmt,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::Notify;

use crate::{
    ObserverConfig, Result, Source, Subscriber, Subscription,
    observer::{Expectation, gate::WaitGate},
};

/// Forwarding closure registered by [`RecordingObserver::map`].
type ChildSink<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub(super) struct ObserverState<T> {
    pub(super) history: Vec<T>,
    children: Vec<ChildSink<T>>,
    attachment: Attachment,
}

#[derive(Debug)]
enum Attachment {
    Detached,
    Attached(Subscription),
    Disposed,
}

pub(super) struct Shared<T> {
    state: Mutex<ObserverState<T>>,
    delivered: Condvar,
    pub(super) notify: Notify,
    config: ObserverConfig,
}

/// Records every value pushed by a producer and lets tests wait and assert on them.
///
/// The producer calls [`on_value`](Self::on_value) (directly or through the
/// [`Subscriber`] impl), possibly from another thread. The test thread reads the
/// history, blocks with the `await_*` family, or awaits an [`Expectation`].
///
/// `RecordingObserver` is a cheap handle: clones share the same history, so one
/// clone can be handed to the producer while the test keeps another.
///
/// # Example
///
/// ```rust
/// use std::{thread, time::Duration};
/// use spyglass::RecordingObserver;
///
/// # fn main() -> spyglass::Result {
/// let observer = RecordingObserver::new();
/// let producer = observer.clone();
///
/// thread::spawn(move || {
///     thread::sleep(Duration::from_millis(10));
///     producer.on_value(42);
/// });
///
/// observer
///     .await_value_timeout(Duration::from_secs(1))
///     .assert_has_value()?
///     .assert_value(&42)?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// History and the list of derived observers live behind
/// one mutex paired with a condition variable. A value is appended before the
/// waiters are woken, so a released waiter always finds it in the history.
/// A single producer per observer is assumed; concurrent readers are fine.
pub struct RecordingObserver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for RecordingObserver<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for RecordingObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> RecordingObserver<T> {
    /// Create a detached observer with an empty history.
    pub fn new() -> Self {
        Self::with_config(ObserverConfig::default())
    }

    /// Create a detached observer with the given configuration.
    pub fn with_config(config: ObserverConfig) -> Self {
        let state = ObserverState {
            history: Vec::with_capacity(config.history_capacity()),
            children: Vec::new(),
            attachment: Attachment::Detached,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                delivered: Condvar::new(),
                notify: Notify::new(),
                config,
            }),
        }
    }

    /// Create an observer and subscribe it to `source`.
    ///
    /// Anything the source replays synchronously during subscription is
    /// recorded before this returns.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by [`Source::subscribe`].
    pub fn attach<S>(source: &S) -> Result<Self>
    where
        S: Source<T> + ?Sized,
    {
        Self::attach_with_config(source, ObserverConfig::default())
    }

    /// Same as [`attach`](Self::attach), with a custom configuration.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by [`Source::subscribe`].
    pub fn attach_with_config<S>(source: &S, config: ObserverConfig) -> Result<Self>
    where
        S: Source<T> + ?Sized,
    {
        let observer = Self::with_config(config);
        let subscription = source.subscribe(Arc::new(observer.clone()))?;
        observer.lock().attachment = Attachment::Attached(subscription);
        Ok(observer)
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, ObserverState<T>> {
        // A panicking assertion on another thread must not wedge the producer.
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn shared(&self) -> &Shared<T> {
        &self.shared
    }

    /// Returns the configuration this observer was built with.
    pub fn config(&self) -> &ObserverConfig {
        &self.shared.config
    }

    fn name(&self) -> &str {
        self.shared.config.name().unwrap_or("observer")
    }

    // ==================== Delivery ====================

    /// Record a value, wake waiters, then forward it to derived observers.
    ///
    /// Safe to call from any thread. Calls racing with readers or waiters are
    /// fine; concurrent calls from several producers are not ordered.
    pub fn on_value(&self, value: T) {
        let (children, forwarded) = {
            let mut state = self.lock();
            let forwarded = (!state.children.is_empty()).then(|| value.clone());
            state.history.push(value);
            tracing::trace!(
                observer = %self.name(),
                history_len = state.history.len(),
                children = state.children.len(),
                "value recorded"
            );
            (state.children.clone(), forwarded)
        };

        self.shared.delivered.notify_all();
        self.shared.notify.notify_waiters();

        if let Some(value) = forwarded {
            for child in &children {
                child(&value);
            }
        }
    }

    // ==================== Reading ====================

    /// Returns the most recently recorded value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValueRecorded`](crate::Error::NoValueRecorded) if nothing was recorded yet.
    pub fn value(&self) -> Result<T> {
        self.lock()
            .history
            .last()
            .cloned()
            .ok_or(crate::Error::NoValueRecorded)
    }

    /// Returns a snapshot of every recorded value in arrival order.
    pub fn value_history(&self) -> Vec<T> {
        self.lock().history.clone()
    }

    /// Returns the number of recorded values.
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    // ==================== Waiting ====================

    /// Block until at least one value has been recorded.
    ///
    /// Returns immediately if the history is already non-empty.
    ///
    /// Blocks the calling thread. Inside an async test, use
    /// [`expect_value`](Self::expect_value) or run the wait in
    /// `spawn_blocking`: on a current-thread runtime, a source forwarding
    /// from a spawned task (such as a `watch` receiver) never gets to run
    /// and the wait never returns.
    pub fn await_value(&self) -> &Self {
        self.block_on_first_value(None);
        self
    }

    /// Block until at least one value has been recorded or `timeout` elapses.
    ///
    /// Does not fail on timeout: check with [`assert_has_value`](Self::assert_has_value)
    /// or [`value`](Self::value) afterwards.
    pub fn await_value_timeout(&self, timeout: Duration) -> &Self {
        self.block_on_first_value(Some(timeout));
        self
    }

    /// Block until a value arrives after this call, ignoring values already recorded.
    ///
    /// Same caveat as [`await_value`](Self::await_value) inside async code:
    /// prefer [`expect_next_value`](Self::expect_next_value) or `spawn_blocking`.
    pub fn await_next_value(&self) -> &Self {
        let state = self.lock();
        let (state, gate) = self.rearm(state);
        self.block_until_open(state, gate, None);
        self
    }

    /// Block until a value arrives after this call or `timeout` elapses.
    ///
    /// Does not fail on timeout, same as [`await_value_timeout`](Self::await_value_timeout).
    pub fn await_next_value_timeout(&self, timeout: Duration) -> &Self {
        let state = self.lock();
        let (state, gate) = self.rearm(state);
        self.block_until_open(state, gate, Some(timeout));
        self
    }

    /// Wait asynchronously until at least one value has been recorded.
    ///
    /// Times out after [`ObserverConfig::default_timeout`] unless overridden
    /// with [`Expectation::within`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// observer.expect_value().within(Duration::from_secs(3)).await?;
    /// ```
    pub fn expect_value(&self) -> Expectation<'_, T> {
        Expectation::new(
            self,
            WaitGate::first_value(),
            self.shared.config.default_timeout(),
        )
    }

    /// Wait asynchronously for a value recorded after this call.
    ///
    /// The gate is armed here, not when the expectation is first polled.
    pub fn expect_next_value(&self) -> Expectation<'_, T> {
        let state = self.lock();
        let (state, gate) = self.rearm(state);
        drop(state);
        Expectation::new(self, gate, self.shared.config.default_timeout())
    }

    /// Arm a gate that opens on the next delivery.
    ///
    /// Takes the state lock so no delivery can slip between reading the
    /// history length and the wait that follows. The gate belongs to the
    /// caller alone; other waiters keep theirs.
    fn rearm<'a>(
        &self,
        state: MutexGuard<'a, ObserverState<T>>,
    ) -> (MutexGuard<'a, ObserverState<T>>, WaitGate) {
        let gate = WaitGate::after(state.history.len());
        tracing::debug!(
            observer = %self.name(),
            armed_at = state.history.len(),
            "waiting for next value"
        );
        (state, gate)
    }

    fn block_on_first_value(&self, timeout: Option<Duration>) {
        let state = self.lock();
        if state.history.is_empty() {
            self.block_until_open(state, WaitGate::first_value(), timeout);
        }
    }

    fn block_until_open(
        &self,
        state: MutexGuard<'_, ObserverState<T>>,
        gate: WaitGate,
        timeout: Option<Duration>,
    ) {
        let closed = |s: &mut ObserverState<T>| !gate.is_open(s.history.len());
        match timeout {
            None => {
                let _state = self
                    .shared
                    .delivered
                    .wait_while(state, closed)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            Some(timeout) => {
                let (state, result) = self
                    .shared
                    .delivered
                    .wait_timeout_while(state, timeout, closed)
                    .unwrap_or_else(PoisonError::into_inner);
                if result.timed_out() {
                    tracing::warn!(
                        observer = %self.name(),
                        ?timeout,
                        history_len = state.history.len(),
                        "wait timed out without a delivery"
                    );
                }
            }
        }
    }

    pub(super) fn is_open(&self, gate: WaitGate) -> bool {
        gate.is_open(self.lock().history.len())
    }

    // ==================== Derived Observers ====================

    /// Create an observer that sees every value of this one through `transform`.
    ///
    /// The current history is replayed synchronously, so the derived history
    /// starts as `history.map(transform)`; every later delivery is forwarded too.
    /// The derived observer has its own gate and can be mapped again.
    ///
    /// The replay runs under this observer's lock: `transform` must not call
    /// back into this observer.
    pub fn map<N, F>(&self, transform: F) -> RecordingObserver<N>
    where
        N: Clone + Send + 'static,
        F: Fn(&T) -> N + Send + Sync + 'static,
    {
        let child = RecordingObserver::<N>::with_config(self.shared.config.derived());
        let transform = Arc::new(transform);

        let mut state = self.lock();
        child
            .lock()
            .history
            .extend(state.history.iter().map(|v| transform(v)));

        let sink = child.clone();
        state
            .children
            .push(Arc::new(move |v: &T| sink.on_value(transform(v))));

        tracing::debug!(
            observer = %self.name(),
            replayed = state.history.len(),
            children = state.children.len(),
            "derived observer registered"
        );
        child
    }

    // ==================== Subscription ====================

    /// Cancel the subscription created by [`attach`](Self::attach).
    ///
    /// Recorded values stay available. Calling it again, or on a detached
    /// observer, has no effect.
    pub fn dispose(&self) {
        let mut state = self.lock();
        if let Attachment::Attached(subscription) = &state.attachment {
            subscription.cancel();
            state.attachment = Attachment::Disposed;
            tracing::debug!(observer = %self.name(), "subscription disposed");
        }
    }

    /// Returns `true` if the observer was attached and then disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(self.lock().attachment, Attachment::Disposed)
    }
}

impl<T: Clone + Send + 'static> Subscriber<T> for RecordingObserver<T> {
    fn on_value(&self, value: T) {
        RecordingObserver::on_value(self, value)
    }
}

impl<T> fmt::Debug for RecordingObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RecordingObserver")
            .field("name", &self.shared.config.name())
            .field("history", &state.history.len())
            .field("children", &state.children.len())
            .field("attachment", &state.attachment)
            .finish()
    }
}
