//! Gesture recognizer - per-module event-stream state machine.
//!
//! The recognizer buffers events and compares the buffer against the bomb's
//! [`GestureSet`] after every accepted event:
//!
//! ```text
//! press ─┐
//! release┼─► append ─► normalize ─► exact match?  ──yes──► Matched, reset
//! tick  ─┘                              │no
//!                                       ▼
//!                      released >= pressed and no template
//!                      starts with the buffer? ──yes──► Rejected, reset
//!                                       │no
//!                                       ▼
//!                                    Pending
//! ```
//!
//! While a press is held every template sharing the buffer as a prefix
//! stays alive; rejection waits for the release.

use crate::gestures::{Event, Gesture, GestureSet};

/// Result of feeding one event to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    /// Still collecting (or the event was ignored)
    Pending,
    /// The buffer spelled a gesture; buffer reset
    Matched(Gesture),
    /// The buffer can no longer become any gesture; buffer reset
    Rejected,
}

/// Buffers press/release/tick events until they spell a gesture.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    pending: Vec<Event>,
    pressed: bool,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            pending: vec![Event::Tick],
            pressed: false,
        }
    }

    /// Handles a press. Repeats while already held are ignored.
    pub fn press(&mut self, gestures: &GestureSet) -> Recognition {
        if self.pressed {
            return Recognition::Pending;
        }
        self.pressed = true;
        self.pending.push(Event::Press);
        self.evaluate(gestures)
    }

    /// Handles a release. Only recorded when it closes a buffered press.
    pub fn release(&mut self, gestures: &GestureSet) -> Recognition {
        let was_pressed = std::mem::replace(&mut self.pressed, false);
        if !was_pressed || self.count(Event::Press) <= self.count(Event::Release) {
            return Recognition::Pending;
        }
        self.pending.push(Event::Release);
        self.evaluate(gestures)
    }

    /// Handles one unit of elapsed clock time.
    pub fn tick(&mut self, gestures: &GestureSet) -> Recognition {
        self.pending.push(Event::Tick);
        self.evaluate(gestures)
    }

    /// Drops the attempt in progress.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.pending.push(Event::Tick);
    }

    /// The normalized event buffer.
    pub fn buffer(&self) -> &[Event] {
        &self.pending
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Advisory index of the figure being drawn: buffered non-Tick events.
    pub fn candidate_digit(&self) -> usize {
        self.pending.iter().filter(|&&e| e != Event::Tick).count()
    }

    fn count(&self, event: Event) -> usize {
        self.pending.iter().filter(|&&e| e == event).count()
    }

    /// Collapses leading `(Tick, Tick)` and `(Tick, Release)` pairs.
    fn normalize(&mut self) {
        while self.pending.len() >= 2
            && self.pending[0] == Event::Tick
            && matches!(self.pending[1], Event::Tick | Event::Release)
        {
            self.pending.remove(1);
        }
    }

    fn evaluate(&mut self, gestures: &GestureSet) -> Recognition {
        self.normalize();

        if let Some(gesture) = gestures.matching(&self.pending) {
            self.reset();
            return Recognition::Matched(gesture);
        }

        if self.count(Event::Release) >= self.count(Event::Press)
            && !gestures.is_prefix_of_any(&self.pending)
        {
            self.reset();
            return Recognition::Rejected;
        }

        Recognition::Pending
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
