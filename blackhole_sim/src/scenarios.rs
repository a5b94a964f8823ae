//! Simulation scenarios for Black Hole modules.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// BH-001: One module, perfect player
    Solo,

    /// BH-002: Several modules sharing one solution, taking turns
    Duo,

    /// BH-003: Progress queries between digits
    Query,

    /// BH-004: An unrelated module solves mid-puzzle
    UnrelatedSolve,

    /// BH-005: A clumsy player who over-holds presses
    Fumble,

    /// BH-006: Many modules starting at once on a thread pool
    Stampede,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Solo,
            ScenarioId::Duo,
            ScenarioId::Query,
            ScenarioId::UnrelatedSolve,
            ScenarioId::Fumble,
            ScenarioId::Stampede,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Solo => "solo",
            ScenarioId::Duo => "duo",
            ScenarioId::Query => "query",
            ScenarioId::UnrelatedSolve => "unrelated_solve",
            ScenarioId::Fumble => "fumble",
            ScenarioId::Stampede => "stampede",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Solo => "1 module, perfect player, solved in 7 digits with no strikes",
            ScenarioId::Duo => "N modules alternate digits on the shared cursor",
            ScenarioId::Query => "Query gesture reports 0, then 3, without moving the cursor",
            ScenarioId::UnrelatedSolve => "Another module solves after 3 digits; requirement drops 7 -> 5",
            ScenarioId::Fumble => "25% over-held presses; strikes happen, modules still solve",
            ScenarioId::Stampede => "16 modules race to start; generation runs exactly once",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solo" | "bh-001" => Ok(ScenarioId::Solo),
            "duo" | "bh-002" => Ok(ScenarioId::Duo),
            "query" | "bh-003" => Ok(ScenarioId::Query),
            "unrelated_solve" | "unrelatedsolve" | "bh-004" => Ok(ScenarioId::UnrelatedSolve),
            "fumble" | "bh-005" => Ok(ScenarioId::Fumble),
            "stampede" | "bh-006" => Ok(ScenarioId::Stampede),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert_eq!("BH-004".parse::<ScenarioId>(), Ok(ScenarioId::UnrelatedSolve));
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }
}
