use std::borrow::Cow;

/// Human-readable label for an enum variant.
///
/// Used in assertion messages and log fields so lifecycle states and events
/// read as `Resumed` or `Pause` rather than their `Debug` form.
///
/// # Example
///
/// ```rust
/// use spyglass::{Label, LifecycleState};
///
/// assert_eq!(LifecycleState::Resumed.label(), "Resumed");
/// ```
pub trait Label {
    /// Returns a human-readable label for this item.
    fn label(&self) -> Cow<'static, str>;
}
