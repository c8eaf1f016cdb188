//! Recording observers: history, blocking waits, derived observers and assertions.

mod assertions;
mod expectation;
mod gate;
mod recording;

pub use expectation::Expectation;
pub use recording::RecordingObserver;
