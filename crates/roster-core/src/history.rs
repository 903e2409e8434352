//! History of reconciliation runs
//!
//! Callers append one entry per check so drift can be followed over time.

use crate::differ::{ReportCounts, ValidationReport};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A record of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the check ran
    pub timestamp: DateTime<Utc>,
    /// Faction checked, or "*" for a whole export
    pub faction: String,
    /// CSV export the check read
    pub csv_path: PathBuf,
    /// Bucket sizes of the report
    pub counts: ReportCounts,
}

/// History file containing all recorded runs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryFile {
    /// Entries grouped by faction, oldest first
    pub entries: BTreeMap<String, Vec<HistoryEntry>>,
}

impl HistoryFile {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Load history from a file, or create empty if not exists
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save history to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Add an entry to the history
    pub fn add_entry(&mut self, entry: HistoryEntry) {
        self.entries
            .entry(entry.faction.clone())
            .or_default()
            .push(entry);
    }

    /// Get history for a specific faction
    pub fn get_faction_history(&self, faction: &str) -> Option<&Vec<HistoryEntry>> {
        self.entries.get(faction)
    }

    /// Get the most recent entry for a faction
    pub fn get_last_entry(&self, faction: &str) -> Option<&HistoryEntry> {
        self.entries.get(faction).and_then(|v| v.last())
    }

    /// Get total number of entries
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}

/// Create a history entry for a finished check
pub fn create_history_entry(
    faction: impl Into<String>,
    csv_path: impl Into<PathBuf>,
    report: &ValidationReport,
) -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc::now(),
        faction: faction.into(),
        csv_path: csv_path.into(),
        counts: report.counts(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::{FieldMismatch, FieldValue, TrackedField};

    fn report_with_mismatch() -> ValidationReport {
        ValidationReport {
            field_mismatches: vec![FieldMismatch {
                unit_name: "Flamecobs".to_string(),
                field: TrackedField::PointsCost,
                csv_value: FieldValue::Number(20),
                current_value: FieldValue::Number(25),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_history_add_and_get() {
        let mut history = HistoryFile::new();
        history.add_entry(create_history_entry(
            "scions-of-taldabaoth",
            "units.csv",
            &ValidationReport::default(),
        ));
        history.add_entry(create_history_entry(
            "scions-of-taldabaoth",
            "units.csv",
            &report_with_mismatch(),
        ));

        assert_eq!(history.total_entries(), 2);
        assert_eq!(history.get_faction_history("scions-of-taldabaoth").map(Vec::len), Some(2));

        let last = history.get_last_entry("scions-of-taldabaoth").unwrap();
        assert_eq!(last.counts.field_mismatches, 1);
        assert!(history.get_last_entry("iron-host").is_none());
    }

    #[test]
    fn test_history_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("roster-history-{}.json", std::process::id()));
        let mut history = HistoryFile::load(&path).unwrap();
        assert_eq!(history.total_entries(), 0);

        history.add_entry(create_history_entry("*", "units.csv", &report_with_mismatch()));
        history.save(&path).unwrap();

        let loaded = HistoryFile::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.total_entries(), 1);
        assert_eq!(loaded.get_last_entry("*").unwrap().csv_path, PathBuf::from("units.csv"));
    }
}
