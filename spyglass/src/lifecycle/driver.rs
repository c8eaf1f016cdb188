use crate::{Lifecycle, LifecycleEvent, LifecycleRegistry, LifecycleState};

/// Manually advanced lifecycle for tests.
///
/// Each transition applies exactly one [`LifecycleEvent`] to the underlying
/// [`Lifecycle`] and returns the driver for chaining. The driver does not
/// validate ordering; that is the lifecycle's concern.
///
/// # Example
///
/// ```rust
/// use spyglass::{LifecycleDriver, LifecycleState};
///
/// let mut driver = LifecycleDriver::resumed();
/// assert_eq!(driver.current_state(), LifecycleState::Resumed);
///
/// driver.pause().stop().destroy();
/// assert_eq!(driver.current_state(), LifecycleState::Destroyed);
/// ```
#[derive(Debug, Default)]
pub struct LifecycleDriver<L: Lifecycle = LifecycleRegistry> {
    lifecycle: L,
}

impl LifecycleDriver {
    /// A driver with no transitions applied.
    pub fn initialized() -> Self {
        Self::with_lifecycle(LifecycleRegistry::new())
    }

    /// A driver moved through `Create`, `Start` and `Resume`.
    pub fn resumed() -> Self {
        let mut driver = Self::initialized();
        driver.create().start().resume();
        driver
    }
}

impl<L: Lifecycle> LifecycleDriver<L> {
    /// Drive a custom lifecycle implementation.
    pub fn with_lifecycle(lifecycle: L) -> Self {
        Self { lifecycle }
    }

    pub fn create(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Create)
    }

    pub fn start(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Start)
    }

    pub fn resume(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Resume)
    }

    pub fn pause(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Pause)
    }

    pub fn stop(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Stop)
    }

    pub fn destroy(&mut self) -> &mut Self {
        self.apply(LifecycleEvent::Destroy)
    }

    fn apply(&mut self, event: LifecycleEvent) -> &mut Self {
        self.lifecycle.handle_event(event);
        self
    }

    pub fn current_state(&self) -> LifecycleState {
        self.lifecycle.current_state()
    }

    /// Returns the driven lifecycle.
    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    /// Consumes the driver and returns the driven lifecycle.
    pub fn into_inner(self) -> L {
        self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialized_applies_nothing() {
        let driver = LifecycleDriver::initialized();
        assert_eq!(driver.current_state(), LifecycleState::Initialized);
        assert!(driver.lifecycle().applied_events().is_empty());
    }

    #[test]
    fn resumed_applies_create_start_resume() {
        let driver = LifecycleDriver::resumed();
        assert_eq!(driver.current_state(), LifecycleState::Resumed);
        assert_eq!(
            driver.lifecycle().applied_events(),
            &[
                LifecycleEvent::Create,
                LifecycleEvent::Start,
                LifecycleEvent::Resume
            ]
        );
    }

    #[test]
    fn each_transition_applies_one_event() {
        let mut driver = LifecycleDriver::resumed();
        driver.pause();
        assert_eq!(driver.current_state(), LifecycleState::Paused);
        driver.resume();
        assert_eq!(driver.current_state(), LifecycleState::Resumed);
        assert_eq!(driver.into_inner().applied_events().len(), 5);
    }

    #[test]
    fn driver_does_not_validate_order() {
        let mut driver = LifecycleDriver::initialized();
        driver.destroy();
        assert_eq!(driver.current_state(), LifecycleState::Destroyed);
    }

    /// Lifecycle that only remembers the labels it was handed.
    #[derive(Default)]
    struct Journal(Vec<LifecycleEvent>);

    impl Lifecycle for Journal {
        fn handle_event(&mut self, event: LifecycleEvent) {
            self.0.push(event);
        }

        fn current_state(&self) -> LifecycleState {
            self.0
                .last()
                .map(|e| e.target_state())
                .unwrap_or_default()
        }
    }

    #[test]
    fn drives_custom_lifecycle() {
        let mut driver = LifecycleDriver::with_lifecycle(Journal::default());
        driver.create().start();
        assert_eq!(driver.current_state(), LifecycleState::Started);
        assert_eq!(driver.lifecycle().0.len(), 2);
    }
}
