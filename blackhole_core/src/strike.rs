//! Reasons a module hands out a strike.

use thiserror::Error;

/// A recoverable in-game failure.
///
/// Only the `Display` text reaches the host; the user recovers by
/// performing the gesture again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrikeReason {
    /// The events can no longer become any gesture
    #[error("Invalid gesture")]
    InvalidGesture,

    /// A valid gesture for the wrong digit
    #[error("Entered {entered} at position {position}, expected {expected}")]
    WrongDigit {
        position: usize,
        expected: u8,
        entered: u8,
    },
}
