//! ScriptedPlayer - a simulated defuser performing gestures.
//!
//! A player turns a gesture template into primitive actions. With a
//! non-zero fumble rate it sometimes holds a press one tick too long,
//! which is how real players miss the timing.

use crate::error::SimError;
use blackhole_core::{Event, Template};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution};
use std::collections::VecDeque;

/// A primitive player action. `Tick` means "wait for the next clock tick".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
    Tick,
}

impl From<Event> for Action {
    fn from(event: Event) -> Self {
        match event {
            Event::Press => Action::Press,
            Event::Release => Action::Release,
            Event::Tick => Action::Tick,
        }
    }
}

/// Replays gesture templates, with optional seeded fumbles.
pub struct ScriptedPlayer {
    rng: ChaCha8Rng,
    fumble: Option<Bernoulli>,
    queue: VecDeque<Action>,
    fumbles: u64,
}

impl ScriptedPlayer {
    /// Creates a player.
    ///
    /// # Arguments
    /// * `seed` - Player seed, independent of the rule seed
    /// * `fumble_rate` - Probability in `[0, 1]` of over-holding each press
    pub fn new(seed: u64, fumble_rate: f64) -> Result<Self, SimError> {
        let fumble = Bernoulli::new(fumble_rate)
            .map_err(|e| SimError::InvalidConfig(format!("fumble rate {}: {}", fumble_rate, e)))?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            fumble: Some(fumble),
            queue: VecDeque::new(),
            fumbles: 0,
        })
    }

    /// A player that never fumbles.
    pub fn perfect(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            fumble: None,
            queue: VecDeque::new(),
            fumbles: 0,
        }
    }

    /// Queues the actions for a template.
    ///
    /// The leading Tick is skipped: the recognizer already starts from one.
    pub fn plan(&mut self, template: &Template) {
        for &event in &template.events()[1..] {
            let fumbled = match self.fumble {
                Some(fumble) if event == Event::Release => fumble.sample(&mut self.rng),
                _ => false,
            };
            if fumbled {
                self.fumbles += 1;
                self.queue.push_back(Action::Tick);
            }
            self.queue.push_back(event.into());
        }
    }

    pub fn next_action(&mut self) -> Option<Action> {
        self.queue.pop_front()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of presses held too long so far.
    pub fn fumbles(&self) -> u64 {
        self.fumbles
    }
}
