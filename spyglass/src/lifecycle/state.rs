use std::{borrow::Cow, fmt};

use crate::Label;

/// One stage of a component lifecycle.
///
/// Stages are ordered: `Initialized` is the pre-state before any event, then
/// `Created`, `Started`, `Resumed`, and on the way down `Paused`, `Stopped`,
/// `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleState {
    #[default]
    Initialized,
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

/// A labeled lifecycle transition. Each event moves to exactly one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// All events in their natural order.
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Create,
        LifecycleEvent::Start,
        LifecycleEvent::Resume,
        LifecycleEvent::Pause,
        LifecycleEvent::Stop,
        LifecycleEvent::Destroy,
    ];

    /// The state a lifecycle is in after this event is applied.
    pub fn target_state(self) -> LifecycleState {
        match self {
            LifecycleEvent::Create => LifecycleState::Created,
            LifecycleEvent::Start => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Pause => LifecycleState::Paused,
            LifecycleEvent::Stop => LifecycleState::Stopped,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }
}

impl LifecycleState {
    /// The event that follows this state in the ordered sequence,
    /// or `None` once destroyed.
    pub fn next_event(self) -> Option<LifecycleEvent> {
        use LifecycleEvent as E;
        use LifecycleState as S;
        match self {
            S::Initialized => Some(E::Create),
            S::Created => Some(E::Start),
            S::Started => Some(E::Resume),
            S::Resumed => Some(E::Pause),
            S::Paused => Some(E::Stop),
            S::Stopped => Some(E::Destroy),
            S::Destroyed => None,
        }
    }

    /// Returns `true` if `event` is the next step of the ordered sequence,
    /// or one of the two ways back up it: `Paused` to `Resume` and
    /// `Stopped` to `Start`.
    pub fn is_adjacent(self, event: LifecycleEvent) -> bool {
        use LifecycleEvent as E;
        use LifecycleState as S;
        self.next_event() == Some(event)
            || matches!((self, event), (S::Paused, E::Resume) | (S::Stopped, E::Start))
    }

    /// Returns `true` in `Started` and `Resumed`, the states in which a
    /// lifecycle-aware producer usually delivers values.
    pub fn is_active(self) -> bool {
        matches!(self, LifecycleState::Started | LifecycleState::Resumed)
    }
}

impl Label for LifecycleState {
    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            LifecycleState::Initialized => "Initialized",
            LifecycleState::Created => "Created",
            LifecycleState::Started => "Started",
            LifecycleState::Resumed => "Resumed",
            LifecycleState::Paused => "Paused",
            LifecycleState::Stopped => "Stopped",
            LifecycleState::Destroyed => "Destroyed",
        })
    }
}

impl Label for LifecycleEvent {
    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            LifecycleEvent::Create => "Create",
            LifecycleEvent::Start => "Start",
            LifecycleEvent::Resume => "Resume",
            LifecycleEvent::Pause => "Pause",
            LifecycleEvent::Stop => "Stop",
            LifecycleEvent::Destroy => "Destroy",
        })
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walking_next_events_visits_every_state_once() {
        let mut state = LifecycleState::default();
        let mut visited = vec![state];
        while let Some(event) = state.next_event() {
            state = event.target_state();
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                LifecycleState::Initialized,
                LifecycleState::Created,
                LifecycleState::Started,
                LifecycleState::Resumed,
                LifecycleState::Paused,
                LifecycleState::Stopped,
                LifecycleState::Destroyed,
            ]
        );
    }

    #[test]
    fn every_event_has_a_distinct_target() {
        let targets: std::collections::HashSet<_> =
            LifecycleEvent::ALL.iter().map(|e| e.target_state()).collect();
        assert_eq!(targets.len(), LifecycleEvent::ALL.len());
    }

    #[test]
    fn adjacency_follows_order() {
        assert!(LifecycleState::Created.is_adjacent(LifecycleEvent::Start));
        assert!(!LifecycleState::Created.is_adjacent(LifecycleEvent::Pause));
        assert!(!LifecycleState::Destroyed.is_adjacent(LifecycleEvent::Create));
    }

    #[test]
    fn coming_back_from_pause_or_stop_is_adjacent() {
        assert!(LifecycleState::Paused.is_adjacent(LifecycleEvent::Resume));
        assert!(LifecycleState::Stopped.is_adjacent(LifecycleEvent::Start));
        assert!(!LifecycleState::Paused.is_adjacent(LifecycleEvent::Start));
        assert!(!LifecycleState::Stopped.is_adjacent(LifecycleEvent::Resume));
        assert!(!LifecycleState::Destroyed.is_adjacent(LifecycleEvent::Start));
    }

    #[test]
    fn active_states() {
        assert!(LifecycleState::Started.is_active());
        assert!(LifecycleState::Resumed.is_active());
        assert!(!LifecycleState::Paused.is_active());
        assert!(!LifecycleState::Initialized.is_active());
    }

    #[test]
    fn labels_and_display() {
        assert_eq!(LifecycleState::Resumed.label(), "Resumed");
        assert_eq!(LifecycleEvent::Pause.to_string(), "Pause");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn state_serializes_by_name() {
        let json = serde_json::to_string(&LifecycleState::Resumed).unwrap();
        assert_eq!(json, "\"Resumed\"");
    }
}
