//! Simulated bomb implementing BombInfo for deterministic testing.

use blackhole_core::MODULE_NAME;
use blackhole_env::{BombInfo, Edgework, SerialNumber};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A bomb with fixed edgework and a scriptable solve list.
///
/// Modules other than Black Holes are never played; scenarios mark them
/// solved directly with [`SimBomb::solve_other_module`].
pub struct SimBomb {
    serial: SerialNumber,
    edgework: Edgework,
    rule_seed: u64,
    modules: Vec<String>,
    solved: Mutex<Vec<String>>,
}

impl SimBomb {
    /// Creates a bomb with `black_holes` Black Hole modules and
    /// `other_modules` unrelated ones.
    pub fn new(
        serial: SerialNumber,
        edgework: Edgework,
        rule_seed: u64,
        black_holes: usize,
        other_modules: usize,
    ) -> Self {
        let mut modules = vec![MODULE_NAME.to_string(); black_holes];
        modules.extend((1..=other_modules).map(|i| format!("Other Module {}", i)));
        Self {
            serial,
            edgework,
            rule_seed,
            modules,
            solved: Mutex::new(Vec::new()),
        }
    }

    /// Marks the next unsolved unrelated module as solved.
    ///
    /// Returns its name, or `None` if every unrelated module is solved.
    pub fn solve_other_module(&self) -> Option<String> {
        let mut solved = self.lock();
        let next = self
            .modules
            .iter()
            .filter(|name| name.as_str() != MODULE_NAME)
            .find(|name| !solved.contains(name))?
            .clone();
        solved.push(next.clone());
        Some(next)
    }

    /// Records a solve reported by a module on this bomb.
    pub fn record_solved(&self, name: &str) {
        self.lock().push(name.to_string());
    }

    pub fn solved_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.solved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BombInfo for SimBomb {
    fn serial_number(&self) -> &SerialNumber {
        &self.serial
    }

    fn edgework(&self) -> Edgework {
        self.edgework
    }

    fn module_names(&self) -> Vec<String> {
        self.modules.clone()
    }

    fn solved_module_names(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn rule_seed(&self) -> u64 {
        self.rule_seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bomb(others: usize) -> SimBomb {
        SimBomb::new(
            SerialNumber::parse("AB3C5D").unwrap(),
            Edgework::default(),
            1,
            2,
            others,
        )
    }

    #[test]
    fn test_module_names() {
        let names = bomb(2).module_names();
        assert_eq!(names.len(), 4);
        assert_eq!(names.iter().filter(|n| n.as_str() == MODULE_NAME).count(), 2);
    }

    #[test]
    fn test_solve_other_module_in_order() {
        let bomb = bomb(2);
        assert_eq!(bomb.solve_other_module().as_deref(), Some("Other Module 1"));
        assert_eq!(bomb.solve_other_module().as_deref(), Some("Other Module 2"));
        assert_eq!(bomb.solve_other_module(), None);
        assert_eq!(bomb.solved_count(), 2);
    }

    #[test]
    fn test_record_black_hole_solve() {
        let bomb = bomb(0);
        bomb.record_solved(MODULE_NAME);
        assert_eq!(bomb.solved_module_names(), vec![MODULE_NAME.to_string()]);
        assert_eq!(bomb.solve_other_module(), None);
    }
}
