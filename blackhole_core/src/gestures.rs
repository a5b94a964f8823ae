//! Gesture templates - the event sequences that spell digits.
//!
//! A template is built from a list of hold lengths:
//!
//! ```text
//! holds [1, 0]  ->  T  P T R  T  P R  T T
//!                   │  └hold┘ gap └h┘ └end┘
//! ```
//!
//! Every template starts with a Tick, separates holds with exactly one
//! Tick and ends with two. After a Release the next event is either a Press
//! (another hold) or the second Tick of the terminator, so no template can
//! be a proper prefix of another.

use serde::{Deserialize, Serialize};

/// A raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    Press,
    Release,
    /// One unit of external clock time elapsed
    Tick,
}

impl Event {
    fn symbol(self) -> char {
        match self {
            Event::Press => 'P',
            Event::Release => 'R',
            Event::Tick => 'T',
        }
    }
}

/// Candidate gestures, as hold lengths in ticks.
pub const POOL: [&[u8]; 10] = [
    &[0],
    &[1],
    &[0, 0],
    &[2],
    &[1, 0],
    &[0, 1],
    &[1, 1],
    &[0, 0, 0],
    &[2, 0],
    &[0, 2],
];

/// Number of candidate gestures.
pub const POOL_SIZE: usize = POOL.len();

/// Number of gestures that denote digits.
pub const DIGIT_GESTURES: usize = 5;

/// An exact event sequence that denotes one gesture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Template(Vec<Event>);

impl Template {
    /// Builds a template from hold lengths.
    pub fn from_holds(holds: &[u8]) -> Self {
        let mut events = vec![Event::Tick];
        for (i, &hold) in holds.iter().enumerate() {
            if i > 0 {
                events.push(Event::Tick);
            }
            events.push(Event::Press);
            events.extend(std::iter::repeat(Event::Tick).take(hold as usize));
            events.push(Event::Release);
        }
        events.extend([Event::Tick, Event::Tick]);
        Self(events)
    }

    /// Wraps an arbitrary event sequence.
    pub fn from_events(events: Vec<Event>) -> Self {
        Self(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &[Event]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|e| write!(f, "{}", e.symbol()))
    }
}

/// What a completed template means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    /// Submit a digit (0-4)
    Digit(u8),
    /// Ask for the shared progress count
    Query,
}

/// The gestures in play on one bomb.
///
/// The query gesture is held in its own field; it is never inferred from a
/// digit position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureSet {
    digits: Vec<Template>,
    query: Option<Template>,
}

impl GestureSet {
    /// Builds a set from explicit templates.
    ///
    /// # Panics
    /// If a template is empty, does not start with a Tick, or is a prefix of
    /// another template.
    pub fn new(digits: Vec<Template>, query: Option<Template>) -> Self {
        let set = Self { digits, query };
        let all: Vec<&Template> = set.iter().map(|(_, t)| t).collect();
        for (i, a) in all.iter().enumerate() {
            assert!(
                a.events().first() == Some(&Event::Tick),
                "template {} does not start with a tick",
                a
            );
            for b in &all[i + 1..] {
                assert!(
                    !a.starts_with(b.events()) && !b.starts_with(a.events()),
                    "templates {} and {} are ambiguous",
                    a,
                    b
                );
            }
        }
        set
    }

    /// Takes gestures from the pool in `order`: five digits, then the query.
    pub fn from_pool_order(order: &[usize], report_progress: bool) -> Self {
        let mut templates = order.iter().map(|&i| Template::from_holds(POOL[i]));
        let digits: Vec<Template> = templates.by_ref().take(DIGIT_GESTURES).collect();
        let query = if report_progress { templates.next() } else { None };
        Self::new(digits, query)
    }

    /// The canonical set: pool entries in their listed order.
    pub fn canonical(report_progress: bool) -> Self {
        let order: Vec<usize> = (0..POOL_SIZE).collect();
        Self::from_pool_order(&order, report_progress)
    }

    /// Iterates every gesture with its template, digits first.
    pub fn iter(&self) -> impl Iterator<Item = (Gesture, &Template)> {
        self.digits
            .iter()
            .enumerate()
            .map(|(i, t)| (Gesture::Digit(i as u8), t))
            .chain(self.query.iter().map(|t| (Gesture::Query, t)))
    }

    /// Returns the template for a gesture, if it is in play.
    pub fn template(&self, gesture: Gesture) -> Option<&Template> {
        match gesture {
            Gesture::Digit(d) => self.digits.get(d as usize),
            Gesture::Query => self.query.as_ref(),
        }
    }

    /// Returns the gesture whose template equals `events` exactly.
    pub fn matching(&self, events: &[Event]) -> Option<Gesture> {
        self.iter()
            .find(|(_, t)| t.events() == events)
            .map(|(g, _)| g)
    }

    /// Whether `events` can still grow into some template.
    pub fn is_prefix_of_any(&self, events: &[Event]) -> bool {
        self.iter().any(|(_, t)| t.starts_with(events))
    }

    pub fn len(&self) -> usize {
        self.digits.len() + usize::from(self.query.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Event::{Press as P, Release as R, Tick as T};

    #[test]
    fn test_from_holds_encoding() {
        assert_eq!(Template::from_holds(&[0]).events(), &[T, P, R, T, T]);
        assert_eq!(
            Template::from_holds(&[1, 0]).events(),
            &[T, P, T, R, T, P, R, T, T]
        );
        assert_eq!(Template::from_holds(&[2]).to_string(), "TPTTRTT");
    }

    #[test]
    fn test_pool_is_disjoint_and_prefix_free() {
        let templates: Vec<Template> = POOL.iter().map(|h| Template::from_holds(h)).collect();
        for (i, a) in templates.iter().enumerate() {
            assert_eq!(a.events()[0], T);
            for (j, b) in templates.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                    assert!(!a.starts_with(b.events()), "{} prefixes {}", b, a);
                }
            }
        }
    }

    #[test]
    fn test_canonical_set() {
        let set = GestureSet::canonical(true);
        assert_eq!(set.len(), 6);
        assert_eq!(set.template(Gesture::Digit(0)), Some(&Template::from_holds(&[0])));
        assert_eq!(set.template(Gesture::Query), Some(&Template::from_holds(&[0, 1])));

        let early = GestureSet::canonical(false);
        assert_eq!(early.len(), 5);
        assert_eq!(early.template(Gesture::Query), None);
    }

    #[test]
    fn test_matching_and_prefix() {
        let set = GestureSet::canonical(true);
        assert_eq!(set.matching(&[T, P, T, R, T, T]), Some(Gesture::Digit(1)));
        assert_eq!(set.matching(&[T, P, R, T, P, T, R, T, T]), Some(Gesture::Query));
        assert_eq!(set.matching(&[T, P, R]), None);

        assert!(set.is_prefix_of_any(&[T]));
        assert!(set.is_prefix_of_any(&[T, P, R, T]));
        assert!(!set.is_prefix_of_any(&[T, P, T, T, T, R]));
    }

    #[test]
    fn test_pool_order_assigns_digits() {
        let set = GestureSet::from_pool_order(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0], true);
        assert_eq!(set.template(Gesture::Digit(0)), Some(&Template::from_holds(&[0, 2])));
        assert_eq!(set.template(Gesture::Query), Some(&Template::from_holds(&[1, 0])));
    }

    #[test]
    #[should_panic]
    fn test_ambiguous_set_rejected() {
        GestureSet::new(
            vec![
                Template::from_events(vec![T, P, R]),
                Template::from_events(vec![T, P, R, T, T]),
            ],
            None,
        );
    }
}
