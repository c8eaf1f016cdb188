/// Single-fire wait token held by one waiter.
///
/// A gate is armed at a history length and opens as soon as the history grows
/// past it. Each waiter arms its own copy under the observer lock, so a
/// later waiter cannot strand an earlier one and a delivery racing with the
/// arm is seen by every gate armed before it was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WaitGate {
    armed_at: usize,
}

impl WaitGate {
    /// A gate that opens on the first value ever recorded.
    pub(crate) fn first_value() -> Self {
        Self::default()
    }

    /// A gate that opens on the first value recorded after `len` values.
    pub(crate) fn after(len: usize) -> Self {
        Self { armed_at: len }
    }

    pub(crate) fn is_open(&self, history_len: usize) -> bool {
        history_len > self.armed_at
    }
}
