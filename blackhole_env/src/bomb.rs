//! Bomb observation trait for Black Hole modules.

use crate::rule_stream::{ChaChaRuleStream, RuleStream};
use crate::types::{BombId, Edgework, SerialNumber};

/// The central interface for observing the bomb a module sits on.
///
/// This trait abstracts the "real world" so that the Black Hole core can
/// run against a live bomb or inside the deterministic simulator.
///
/// # Implementations
///
/// - **Simulation**: `SimBomb` - fixed edgework, scripted solves
///
/// # Determinism
///
/// Everything the puzzle generator reads comes through here: the serial
/// number, the edgework and the rule seed. Two bombs that agree on those
/// produce the same puzzle.
pub trait BombInfo: Send + Sync + 'static {
    /// Returns the bomb's serial number.
    fn serial_number(&self) -> &SerialNumber;

    /// Returns the port, indicator, battery and holder counts.
    fn edgework(&self) -> Edgework;

    /// Returns the display names of every module on the bomb.
    ///
    /// Used to count how many Black Hole modules share the puzzle.
    fn module_names(&self) -> Vec<String>;

    /// Returns the display names of every module solved so far.
    ///
    /// Non-decreasing over the life of a bomb.
    fn solved_module_names(&self) -> Vec<String>;

    /// Returns the rule seed selected by the mission.
    fn rule_seed(&self) -> u64;

    /// Returns the identity shared by all modules on this bomb.
    fn bomb_id(&self) -> BombId {
        BombId::from_serial(self.serial_number())
    }

    /// Opens a fresh rule stream at the start of the seeded sequence.
    fn rule_stream(&self) -> Box<dyn RuleStream> {
        Box::new(ChaChaRuleStream::new(self.rule_seed()))
    }
}
