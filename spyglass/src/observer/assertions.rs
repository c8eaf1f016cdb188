use std::fmt;

use crate::{Error, RecordingObserver, Result};

/// Assertions over the recorded history.
///
/// Every assertion returns the observer on success so calls chain with `?`:
///
/// ```rust
/// # use spyglass::RecordingObserver;
/// # fn main() -> spyglass::Result {
/// let observer = RecordingObserver::new();
/// observer.on_value(1);
/// observer.on_value(2);
///
/// observer
///     .assert_has_value()?
///     .assert_history_size(2)?
///     .assert_value(&2)?
///     .assert_never(|v| *v > 10)?;
/// # Ok(())
/// # }
/// ```
///
/// Failures are [`Error::AssertionMismatch`] with a message suitable for test
/// output, or [`Error::NoValueRecorded`] when the assertion needs a latest
/// value and the history is empty.
impl<T: Clone + Send + fmt::Debug + 'static> RecordingObserver<T> {
    /// Fails if nothing has been recorded.
    pub fn assert_has_value(&self) -> Result<&Self> {
        if self.lock().history.is_empty() {
            return Err(Error::NoValueRecorded);
        }
        Ok(self)
    }

    /// Fails if anything has been recorded. The message shows the latest value.
    pub fn assert_no_value(&self) -> Result<&Self> {
        if let Some(value) = self.lock().history.last() {
            return Err(Error::mismatch(format!(
                "expected no value, but found {value:?}"
            )));
        }
        Ok(self)
    }

    /// Fails unless exactly `expected` values have been recorded.
    pub fn assert_history_size(&self, expected: usize) -> Result<&Self> {
        let actual = self.lock().history.len();
        if actual != expected {
            return Err(Error::mismatch(format!(
                "expected history size {expected}, but was {actual}"
            )));
        }
        Ok(self)
    }

    /// Fails unless the latest value equals `expected`.
    ///
    /// Use `Option<_>` as the value type to assert on an absent payload,
    /// e.g. `assert_value(&None)`.
    pub fn assert_value(&self, expected: &T) -> Result<&Self>
    where
        T: PartialEq,
    {
        let state = self.lock();
        let actual = state.history.last().ok_or(Error::NoValueRecorded)?;
        if actual != expected {
            return Err(Error::mismatch(format!(
                "expected {expected:?}, but was {actual:?}"
            )));
        }
        Ok(self)
    }

    /// Fails unless `predicate` accepts the latest value.
    pub fn assert_value_matches<F>(&self, predicate: F) -> Result<&Self>
    where
        F: FnOnce(&T) -> bool,
    {
        let actual = self.value()?;
        if !predicate(&actual) {
            return Err(Error::mismatch(format!(
                "value {actual:?} does not match the predicate"
            )));
        }
        Ok(self)
    }

    /// Fails on the first recorded value, latest or not, that `predicate` accepts.
    ///
    /// The message reports the index of the offending value.
    pub fn assert_never<F>(&self, predicate: F) -> Result<&Self>
    where
        F: Fn(&T) -> bool,
    {
        let history = self.value_history();
        if let Some((index, value)) = history.iter().enumerate().find(|&(_, v)| predicate(v)) {
            return Err(Error::mismatch(format!(
                "value at index {index} ({value:?}) matches the predicate"
            )));
        }
        Ok(self)
    }

    /// Fails unless the full history equals `expected`, in order.
    pub fn assert_value_history(&self, expected: &[T]) -> Result<&Self>
    where
        T: PartialEq,
    {
        let history = self.value_history();
        if history != expected {
            return Err(Error::mismatch(format!(
                "expected history {expected:?}, but was {history:?}"
            )));
        }
        Ok(self)
    }
}
