//! JSON exporter for simulation traces.
//!
//! Exports a run as JSON: the generated solution and every outcome,
//! strike and reduction, stamped with the tick it happened on.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// One notable thing that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// World tick the entry was recorded on
    pub tick: u64,

    /// Instance id of the module involved (0 for bomb-wide entries)
    pub module: u32,

    pub kind: TraceKind,
}

/// What a trace entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceKind {
    Correct { position: usize, digit: u8 },
    Incorrect { position: usize, expected: u8, entered: u8 },
    InvalidGesture,
    Query { entered_total: usize },
    Solved,
    OtherModuleSolved { name: String },
    Reduction { from: usize, to: usize },
}

/// Complete export of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Rule seed
    pub seed: u64,

    /// Serial number of the simulated bomb
    pub serial: String,

    /// Generated solution
    pub solution: Vec<u8>,

    /// Trace entries, in order
    pub entries: Vec<TraceEntry>,

    /// Whether the scenario passed
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Writes the export to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_kind_tagged() {
        let entry = TraceEntry {
            tick: 4,
            module: 1,
            kind: TraceKind::Correct { position: 0, digit: 3 },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"]["type"], "correct");
        assert_eq!(json["kind"]["digit"], 3);
    }

    #[test]
    fn test_write_to_file() {
        let export = SimExport {
            scenario: "solo".to_string(),
            seed: 1,
            serial: "AB3C5D".to_string(),
            solution: vec![1, 3, 3, 2, 2, 1, 3],
            entries: vec![],
            passed: true,
            failure_reason: None,
        };
        let path = std::env::temp_dir().join("blackhole_sim_export_test.json");
        let path = path.to_string_lossy().to_string();

        export.write_to_file(&path).unwrap();
        let read: SimExport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.solution, export.solution);
        assert!(!std::fs::read_to_string(&path).unwrap().contains("failure_reason"));
        let _ = std::fs::remove_file(&path);
    }
}
