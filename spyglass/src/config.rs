use std::time::Duration;

/// Configuration for a [`RecordingObserver`](crate::RecordingObserver).
///
/// Use the builder pattern to customize, or use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use spyglass::ObserverConfig;
///
/// let config = ObserverConfig::default()
///     .with_name("temperature")                      // Shown in logs and Debug output
///     .with_default_timeout(Duration::from_secs(3))  // Used by `expect_value()`
///     .with_history_capacity(64);                    // Preallocated history slots
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverConfig {
    /// Timeout applied by async expectations unless overridden with `within()`.
    /// Default: 1s
    default_timeout: Duration,

    /// Initial capacity of the recorded history.
    /// Default: 16
    history_capacity: usize,

    /// Optional name used in log fields and `Debug` output.
    /// Default: none
    name: Option<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            default_timeout: Duration::from_secs(1),
            history_capacity: 16,
            name: None,
        }
    }
}

impl ObserverConfig {
    /// Set the timeout used by [`expect_value`](crate::RecordingObserver::expect_value)
    /// and [`expect_next_value`](crate::RecordingObserver::expect_next_value).
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Returns the default async expectation timeout.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Set the initial history capacity.
    ///
    /// History still grows without bound; this only avoids early reallocations.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Returns the initial history capacity.
    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Set the observer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the observer name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Config for an observer derived via `map`: same settings, name suffixed with `.map`.
    pub(crate) fn derived(&self) -> Self {
        Self {
            name: self.name.as_ref().map(|n| format!("{n}.map")),
            ..self.clone()
        }
    }
}
