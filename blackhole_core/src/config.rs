//! Module configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a Black Hole module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Digits each module must accept before it is solved (default: 7)
    pub digits_per_module: usize,

    /// How far the remaining requirement shrinks when an unrelated module
    /// is solved (default: 2)
    pub decrement_step: usize,

    /// Whether the sixth gesture reports progress instead of being unused
    /// (default: true)
    pub report_progress: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            digits_per_module: 7,
            decrement_step: 2,
            report_progress: true,
        }
    }
}
