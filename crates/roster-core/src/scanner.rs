//! Directory scanner for discovering unit CSV exports

use crate::error::Result;
use crate::faction::FactionTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// A CSV export found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvSource {
    /// Full path to the file
    pub path: PathBuf,
    /// Canonical faction id guessed from the file name
    pub faction_hint: String,
}

/// Result of scanning directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Discovered exports, sorted by path
    pub sources: Vec<CsvSource>,
}

impl ScanResult {
    /// Exports whose faction hint matches a canonical faction id
    pub fn find_faction(&self, faction_id: &str) -> Vec<&CsvSource> {
        self.sources
            .iter()
            .filter(|s| s.faction_hint == faction_id)
            .collect()
    }

    /// Distinct faction hints, sorted
    pub fn factions(&self) -> Vec<&str> {
        let mut factions: Vec<&str> = self
            .sources
            .iter()
            .map(|s| s.faction_hint.as_str())
            .collect();
        factions.sort_unstable();
        factions.dedup();
        factions
    }

    /// Total number of files found
    pub fn total_files(&self) -> usize {
        self.sources.len()
    }
}

/// Scan one or more directories for CSV exports
pub fn scan_directory<P: AsRef<Path>>(roots: &[P], factions: &FactionTable) -> Result<ScanResult> {
    let mut sources = Vec::new();

    for root in roots {
        let root = root.as_ref();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || !path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                sources.push(CsvSource {
                    path: path.to_path_buf(),
                    faction_hint: faction_hint(stem, factions),
                });
            }
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));

    info!(files = sources.len(), roots = roots.len(), "scanned for CSV exports");

    Ok(ScanResult {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        sources,
    })
}

/// Guess a faction id from a file stem
///
/// Examples:
/// - "Scions of Taldabaoth" -> "scions-of-taldabaoth"
/// - "scions_of_taldaboath_units" -> "scions-of-taldabaoth"
/// - "iron-host-units" -> "iron-host"
fn faction_hint(stem: &str, factions: &FactionTable) -> String {
    const SUFFIXES: &[&str] = &["_units", "-units", " units"];

    let lower = stem.to_lowercase();
    let base = SUFFIXES
        .iter()
        .find_map(|s| lower.strip_suffix(s))
        .unwrap_or(&lower);

    factions.canonicalize(&base.replace(['_', '-'], " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::DEFAULT_FACTION_ALIASES;
    use std::fs;

    fn table() -> FactionTable {
        FactionTable::new(DEFAULT_FACTION_ALIASES.iter().copied())
    }

    #[test]
    fn test_faction_hint_variants() {
        let factions = table();
        assert_eq!(faction_hint("Scions of Taldabaoth", &factions), "scions-of-taldabaoth");
        assert_eq!(faction_hint("scions_of_taldaboath_units", &factions), "scions-of-taldabaoth");
        assert_eq!(faction_hint("iron-host-units", &factions), "iron-host");
        assert_eq!(faction_hint("Iron Host", &factions), "iron-host");
    }

    #[test]
    fn test_scan_directory() {
        let root = std::env::temp_dir().join(format!("roster-scan-{}", std::process::id()));
        let nested = root.join("exports");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("scions_units.csv"), "name\n").unwrap();
        fs::write(nested.join("Iron Host.CSV"), "name\n").unwrap();
        fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let result = scan_directory(&[&root], &table()).unwrap();
        fs::remove_dir_all(&root).unwrap();

        assert_eq!(result.total_files(), 2);
        assert_eq!(result.factions(), vec!["iron-host", "scions-of-taldabaoth"]);
        assert_eq!(result.find_faction("iron-host").len(), 1);
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let result = scan_directory(&["/nonexistent/roster-exports"], &table());
        assert!(result.is_err());
    }
}
