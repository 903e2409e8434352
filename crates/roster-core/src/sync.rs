//! Batch check-and-regenerate over several factions
//!
//! A manifest lists CSV exports and the current data they should be checked
//! against. Each entry is reconciled and its generated files are written to
//! the manifest's output directory.

use crate::differ::{Differ, RuleMatching, ValidationReport};
use crate::emitter::{emit_faction, select_faction};
use crate::error::{Error, Result};
use crate::faction::FactionTable;
use crate::pipeline::CsvPipeline;
use crate::unit::load_current_units;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One faction to reconcile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntry {
    /// CSV export to read
    pub csv: PathBuf,
    /// Current unit data (JSON or generated source); no check when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PathBuf>,
    /// Faction name or id; canonicalized before use
    pub faction: String,
}

/// A manifest of sync operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncManifest {
    /// Vocabulary file; built-in defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<PathBuf>,
    /// Output directory for generated files
    pub output_dir: PathBuf,
    /// Keyword / special-rule strictness
    #[serde(default)]
    pub rules: RuleMatching,
    /// Fail on duplicate unit ids instead of passing them through
    #[serde(default)]
    pub strict_ids: bool,
    /// Factions to process
    pub entries: Vec<SyncEntry>,
}

impl SyncManifest {
    /// Create a manifest with no entries
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            vocabulary: None,
            output_dir: output_dir.into(),
            rules: RuleMatching::default(),
            strict_ids: false,
            entries: Vec::new(),
        }
    }

    /// Load a manifest from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the manifest to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Outcome of one manifest entry
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    /// Canonical faction id
    pub faction: String,
    /// Units parsed for this faction
    pub unit_count: usize,
    /// Reconciliation report, when a current set was given
    pub report: Option<ValidationReport>,
    /// Generated files written
    pub files_written: Vec<PathBuf>,
}

/// Result of running a manifest
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Successful entries, in manifest order
    pub outcomes: Vec<EntryOutcome>,
    /// Entries that failed (csv path, error message)
    pub errors: Vec<(PathBuf, String)>,
}

impl SyncResult {
    /// Total generated files written
    pub fn files_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.files_written.len()).sum()
    }
}

/// Run every entry of a manifest; entry failures are collected, not fatal
pub fn run_sync(manifest: &SyncManifest) -> Result<SyncResult> {
    let vocabulary = Vocabulary::load_or_default(manifest.vocabulary.as_ref())?;
    let pipeline = CsvPipeline::new(&vocabulary).strict_ids(manifest.strict_ids);
    let differ = Differ::new(&vocabulary).rule_matching(manifest.rules);
    let factions = FactionTable::from_vocabulary(&vocabulary);

    fs::create_dir_all(&manifest.output_dir)?;

    let mut result = SyncResult::default();
    for entry in &manifest.entries {
        match run_entry(entry, &pipeline, &differ, &factions, &manifest.output_dir) {
            Ok(outcome) => result.outcomes.push(outcome),
            Err(e) => result.errors.push((entry.csv.clone(), e.to_string())),
        }
    }

    info!(
        entries = manifest.entries.len(),
        failed = result.errors.len(),
        files = result.files_written(),
        "sync finished"
    );

    Ok(result)
}

fn run_entry(
    entry: &SyncEntry,
    pipeline: &CsvPipeline,
    differ: &Differ,
    factions: &FactionTable,
    output_dir: &Path,
) -> Result<EntryOutcome> {
    let faction = factions.canonicalize(&entry.faction);
    let units = select_faction(&pipeline.parse_file(&entry.csv)?, &faction);

    let report = match &entry.current {
        Some(path) => {
            let current = load_current_units(path)?;
            let current: Vec<_> = current
                .into_iter()
                .filter(|u| u.faction_labels().any(|f| factions.canonicalize(f) == faction))
                .collect();
            Some(differ.diff(&units, &current))
        }
        None => None,
    };

    let mut files_written = Vec::new();
    for file in emit_faction(&units, &faction)? {
        let path = output_dir.join(&file.file_name);
        fs::write(&path, &file.content)?;
        files_written.push(path);
    }

    Ok(EntryOutcome {
        faction,
        unit_count: units.len(),
        report,
        files_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serialization() {
        let mut manifest = SyncManifest::new("generated");
        manifest.entries.push(SyncEntry {
            csv: PathBuf::from("exports/scions.csv"),
            current: Some(PathBuf::from("data/scions.json")),
            faction: "Scions of Taldabaoth".to_string(),
        });

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let loaded: SyncManifest = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.output_dir, PathBuf::from("generated"));
        assert_eq!(loaded.rules, RuleMatching::Loose);
        assert_eq!(loaded.entries, manifest.entries);
    }

    #[test]
    fn test_run_sync_writes_files_and_reports() {
        let dir = std::env::temp_dir().join(format!("roster-sync-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let csv_path = dir.join("scions.csv");
        fs::write(
            &csv_path,
            "Unit Name,Faction,Points Cost,Availability,Keywords\n\
             Flamecobs,Scions of Taldabaoth,20,1,\"[Infantry, Projectile]\"\n\
             Grey Wolf,Iron Host,30,2,Infantry\n",
        )
        .unwrap();
        let current_path = dir.join("current.json");
        fs::write(
            &current_path,
            r#"[{"id": "flamecobs", "name": "Flamecobs", "faction": "Scions of Taldabaoth",
                 "pointsCost": 25, "availability": 1, "keywords": ["Infantry", "Projectile"]}]"#,
        )
        .unwrap();

        let mut manifest = SyncManifest::new(dir.join("out"));
        manifest.entries.push(SyncEntry {
            csv: csv_path,
            current: Some(current_path),
            faction: "Scions".to_string(),
        });
        manifest.entries.push(SyncEntry {
            csv: dir.join("missing.csv"),
            current: None,
            faction: "Iron Host".to_string(),
        });

        let result = run_sync(&manifest).unwrap();
        let written = dir.join("out").join("scions-of-taldabaoth_troop.ts");
        let written_exists = written.exists();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.errors.len(), 1);

        let outcome = &result.outcomes[0];
        assert_eq!(outcome.faction, "scions-of-taldabaoth");
        assert_eq!(outcome.unit_count, 1);
        let report = outcome.report.as_ref().unwrap();
        assert_eq!(report.field_mismatches.len(), 1);
        assert!(report.extra_in_current.is_empty());
        assert!(written_exists);
    }
}
