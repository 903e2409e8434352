//! CSV document -> ordered list of canonical units

use crate::error::{Error, Result};
use crate::normalizer::{is_placeholder_name, RowNormalizer, UnitField};
use crate::parser::{read_csv, read_csv_str};
use crate::table::RawTable;
use crate::unit::CanonicalUnit;
use crate::vocabulary::Vocabulary;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Parses unit exports into canonical units
///
/// Row order is preserved and duplicates are passed through unless
/// [`CsvPipeline::strict_ids`] is enabled.
#[derive(Debug, Clone)]
pub struct CsvPipeline<'a> {
    normalizer: RowNormalizer<'a>,
    strict_ids: bool,
}

impl<'a> CsvPipeline<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self {
            normalizer: RowNormalizer::new(vocabulary),
            strict_ids: false,
        }
    }

    /// Fail on a repeated (faction, id) pair instead of passing it through
    pub fn strict_ids(mut self, strict: bool) -> Self {
        self.strict_ids = strict;
        self
    }

    /// The normalizer this pipeline uses
    pub fn normalizer(&self) -> &RowNormalizer<'a> {
        &self.normalizer
    }

    /// Parse CSV text
    pub fn parse(&self, content: &str) -> Result<Vec<CanonicalUnit>> {
        self.parse_named(content, "<csv>")
    }

    /// Parse CSV text, labelling errors with `source_name`
    pub fn parse_named(&self, content: &str, source_name: &str) -> Result<Vec<CanonicalUnit>> {
        let table = read_csv_str(content, source_name)?;
        self.parse_table(&table)
    }

    /// Parse a CSV file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<CanonicalUnit>> {
        let table = read_csv(path)?;
        self.parse_table(&table)
    }

    /// Normalize every non-placeholder row of an already-read table
    pub fn parse_table(&self, table: &RawTable) -> Result<Vec<CanonicalUnit>> {
        let mut units = Vec::with_capacity(table.row_count());
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut skipped = 0usize;

        for record in table.records() {
            let name = self.normalizer.field(&record, UnitField::Name).unwrap_or("");
            if is_placeholder_name(name) {
                skipped += 1;
                continue;
            }

            let unit = self.normalizer.normalize_row(&record);

            let key = (unit.faction_id.clone(), unit.id.clone());
            if !seen.insert(key) {
                if self.strict_ids {
                    return Err(Error::DuplicateUnitId {
                        id: unit.id,
                        faction: unit.faction_id,
                    });
                }
                warn!(id = %unit.id, faction = %unit.faction_id, "duplicate unit id in CSV");
            }

            units.push(unit);
        }

        debug!(
            source = %table.source_path.display(),
            units = units.len(),
            skipped,
            "parsed unit CSV"
        );

        Ok(units)
    }
}

/// Parse CSV text with the default vocabulary
pub fn parse_csv(content: &str) -> Result<Vec<CanonicalUnit>> {
    CsvPipeline::new(&Vocabulary::default()).parse(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Unit Name,Faction,Points Cost,Availability,Command,Keywords
Flamecobs,Scions of Taldabaoth,20,1,,\"[Infantry, Projectile, Red Cap]\"
,Scions of Taldabaoth,0,0,,
null,Scions of Taldabaoth,0,0,,
Mounted Hetman,Scions of Taldaboath,140,1,2,\"Cavalry, Character\"
undefined,,,,,
";

    #[test]
    fn test_filters_placeholder_rows_and_keeps_order() {
        let units = parse_csv(CSV).unwrap();

        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["flamecobs", "mounted-hetman"]);
        assert_eq!(units[1].faction_id, "scions-of-taldabaoth");
        assert_eq!(units[1].command, Some(2));
        assert_eq!(units[0].command, None);
    }

    #[test]
    fn test_duplicates_pass_through_by_default() {
        let csv = "name,faction,points\nFlamecobs,Scions,20\nflamecobs,Scions,25\n";
        let units = parse_csv(csv).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].points_cost, 20);
        assert_eq!(units[1].points_cost, 25);
    }

    #[test]
    fn test_strict_ids_rejects_duplicates() {
        let vocab = Vocabulary::default();
        let csv = "name,faction,points\nFlamecobs,Scions,20\nflamecobs,Scions,25\n";
        let err = CsvPipeline::new(&vocab).strict_ids(true).parse(csv).unwrap_err();

        match err {
            Error::DuplicateUnitId { id, faction } => {
                assert_eq!(id, "flamecobs");
                assert_eq!(faction, "scions-of-taldabaoth");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_id_in_different_factions_is_not_duplicate() {
        let vocab = Vocabulary::default();
        let csv = "name,faction\nHetman,Scions\nHetman,Iron Host\n";
        let units = CsvPipeline::new(&vocab).strict_ids(true).parse(csv).unwrap();

        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_structural_failure_is_error() {
        assert!(parse_csv("").is_err());
    }
}
