//! Deterministic lifecycle driving for components a producer depends on.

mod driver;
mod registry;
mod state;

pub use driver::LifecycleDriver;
pub use registry::{Lifecycle, LifecycleRegistry};
pub use state::{LifecycleEvent, LifecycleState};
