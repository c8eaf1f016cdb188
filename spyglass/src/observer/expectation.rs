use std::{fmt, future::IntoFuture, pin::Pin, time::Duration};

use tokio::time::Instant;

use crate::{Error, RecordingObserver, Result, observer::gate::WaitGate};

/// An async wait for a value on a [`RecordingObserver`].
///
/// Created by [`RecordingObserver::expect_value`] and
/// [`RecordingObserver::expect_next_value`]. Resolves once the gate armed at
/// creation opens. If the timeout expires first, returns
/// [`Error::WaitTimeout`] carrying the timeout and the number of values
/// recorded so far.
///
/// Dropping the future stops waiting; the subscription and the recorded
/// history are left untouched.
///
/// # Example
///
/// ```ignore
/// // Default timeout from ObserverConfig (1s)
/// observer.expect_value().await?;
///
/// // With a custom timeout
/// observer.expect_next_value()
///     .within(Duration::from_secs(3))
///     .await?;
/// ```
pub struct Expectation<'a, T> {
    observer: &'a RecordingObserver<T>,
    gate: WaitGate,
    timeout: Duration,
}

impl<'a, T: Clone + Send + 'static> Expectation<'a, T> {
    pub(crate) fn new(observer: &'a RecordingObserver<T>, gate: WaitGate, timeout: Duration) -> Self {
        Self {
            observer,
            gate,
            timeout,
        }
    }

    /// Override the default timeout.
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(self) -> Result {
        // A timeout too large to represent waits without a deadline.
        let deadline = Instant::now().checked_add(self.timeout);

        loop {
            // Register interest before checking, so a delivery between the
            // check and the await still wakes us.
            let notified = self.observer.shared().notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.observer.is_open(self.gate) {
                return Ok(());
            }

            let Some(deadline) = deadline else {
                notified.await;
                continue;
            };
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                if self.observer.is_open(self.gate) {
                    return Ok(());
                }
                return Err(Error::WaitTimeout(
                    self.timeout,
                    self.observer.history_len(),
                ));
            }
        }
    }
}

impl<'a, T> IntoFuture for Expectation<'a, T>
where
    T: Clone + Send + 'static,
{
    type Output = Result;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

impl<T> fmt::Debug for Expectation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("observer", &self.observer)
            .field("gate", &self.gate)
            .field("timeout", &self.timeout)
            .finish()
    }
}
