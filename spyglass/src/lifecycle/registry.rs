use std::fmt;

use tokio::sync::watch;

use crate::{LifecycleEvent, LifecycleState};

/// The lifecycle contract driven by [`LifecycleDriver`](crate::LifecycleDriver).
///
/// Accepts the ordered events `Create` through `Destroy` and reports the
/// current state. Whether out-of-order events are accepted is up to the
/// implementation.
pub trait Lifecycle {
    /// Apply one labeled event.
    fn handle_event(&mut self, event: LifecycleEvent);

    /// Returns the present state.
    fn current_state(&self) -> LifecycleState;
}

/// Default [`Lifecycle`] implementation.
///
/// Applies each event's target state without rejecting order; a move that
/// skips ahead, or goes back other than `Resume` after `Paused` and `Start`
/// after `Stopped`, is accepted and logged at `warn`.
/// Every applied state is published on a `watch` channel, so producers that
/// depend on the lifecycle (or a [`RecordingObserver`](crate::RecordingObserver))
/// can follow it:
///
/// ```ignore
/// let registry = LifecycleRegistry::new();
/// let states = RecordingObserver::attach(&registry.states())?;
/// ```
pub struct LifecycleRegistry {
    state: LifecycleState,
    applied: Vec<LifecycleEvent>,
    states: watch::Sender<LifecycleState>,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        let (states, _) = watch::channel(LifecycleState::Initialized);
        Self {
            state: LifecycleState::Initialized,
            applied: Vec::new(),
            states,
        }
    }

    /// Returns a receiver that follows every state this registry enters.
    ///
    /// The receiver starts at the current state.
    pub fn states(&self) -> watch::Receiver<LifecycleState> {
        self.states.subscribe()
    }

    /// Returns every event applied so far, in order.
    pub fn applied_events(&self) -> &[LifecycleEvent] {
        &self.applied
    }
}

impl Default for LifecycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for LifecycleRegistry {
    fn handle_event(&mut self, event: LifecycleEvent) {
        let from = self.state;
        let to = event.target_state();
        if !from.is_adjacent(event) {
            tracing::warn!(%from, %event, %to, "lifecycle event applied out of order");
        }

        self.state = to;
        self.applied.push(event);
        self.states.send_replace(to);
        tracing::debug!(%from, %event, %to, "lifecycle transition");
    }

    fn current_state(&self) -> LifecycleState {
        self.state
    }
}

impl fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("state", &self.state)
            .field("applied", &self.applied)
            .field("receivers", &self.states.receiver_count())
            .finish()
    }
}
