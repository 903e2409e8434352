//! Reconciliation of CSV-derived units against a current unit set
//!
//! Units are paired by id first, then by case-insensitive name within the
//! same canonical faction. Only a fixed set of numeric/flag fields can
//! produce a hard mismatch; keyword and special-rule lists are compared
//! loosely and reported as advisory drift.

use crate::error::Error;
use crate::faction::FactionTable;
use crate::unit::CanonicalUnit;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How keyword and special-rule tokens are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMatching {
    /// Tokens are equivalent when either contains the other, ignoring case
    #[default]
    Loose,
    /// Tokens must be equal
    Exact,
    /// Lists are not compared
    Off,
}

impl RuleMatching {
    fn equivalent(&self, a: &str, b: &str) -> bool {
        match self {
            RuleMatching::Loose => {
                let a = a.to_lowercase();
                let b = b.to_lowercase();
                a.contains(&b) || b.contains(&a)
            }
            RuleMatching::Exact => a == b,
            RuleMatching::Off => true,
        }
    }
}

impl FromStr for RuleMatching {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loose" => Ok(RuleMatching::Loose),
            "exact" => Ok(RuleMatching::Exact),
            "off" | "none" => Ok(RuleMatching::Off),
            other => Err(Error::InvalidSetting(format!("rule matching '{}'", other))),
        }
    }
}

/// Fields that can produce a hard mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedField {
    PointsCost,
    Availability,
    HighCommand,
    Command,
}

impl TrackedField {
    pub const ALL: [TrackedField; 4] = [
        TrackedField::PointsCost,
        TrackedField::Availability,
        TrackedField::HighCommand,
        TrackedField::Command,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::PointsCost => "pointsCost",
            TrackedField::Availability => "availability",
            TrackedField::HighCommand => "highCommand",
            TrackedField::Command => "command",
        }
    }

    fn value_of(&self, unit: &CanonicalUnit) -> FieldValue {
        match self {
            TrackedField::PointsCost => FieldValue::Number(unit.points_cost),
            TrackedField::Availability => FieldValue::Number(unit.availability),
            TrackedField::HighCommand => FieldValue::Flag(unit.high_command),
            TrackedField::Command => unit.command.map_or(FieldValue::Absent, FieldValue::Number),
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a tracked field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u32),
    Flag(bool),
    Absent,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Absent => write!(f, "-"),
        }
    }
}

/// A tracked field that disagrees on a matched pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMismatch {
    pub unit_name: String,
    pub field: TrackedField,
    pub csv_value: FieldValue,
    pub current_value: FieldValue,
}

/// Token lists compared for drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListField {
    /// Characteristics and keywords together
    Keywords,
    SpecialRules,
}

impl ListField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListField::Keywords => "keywords",
            ListField::SpecialRules => "specialRules",
        }
    }
}

/// Advisory: tokens on one side with no equivalent on the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDrift {
    pub unit_name: String,
    pub field: ListField,
    pub only_in_csv: Vec<String>,
    pub only_in_current: Vec<String>,
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// CSV units with no counterpart in the current set
    pub missing_in_current: Vec<CanonicalUnit>,
    /// Current units with no counterpart in the CSV
    pub extra_in_current: Vec<CanonicalUnit>,
    /// Tracked-field disagreements on matched pairs
    pub field_mismatches: Vec<FieldMismatch>,
    /// Keyword / special-rule drift on matched pairs
    #[serde(default)]
    pub rule_drift: Vec<RuleDrift>,
    /// Ids that occur more than once in the CSV set
    #[serde(default)]
    pub duplicate_ids: Vec<String>,
}

impl ValidationReport {
    /// True when missing, extra and mismatch buckets are all empty
    pub fn is_clean(&self) -> bool {
        self.missing_in_current.is_empty()
            && self.extra_in_current.is_empty()
            && self.field_mismatches.is_empty()
    }

    pub fn counts(&self) -> ReportCounts {
        ReportCounts {
            missing_in_current: self.missing_in_current.len(),
            extra_in_current: self.extra_in_current.len(),
            field_mismatches: self.field_mismatches.len(),
            rule_drift: self.rule_drift.len(),
            duplicate_ids: self.duplicate_ids.len(),
        }
    }
}

/// Bucket sizes of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCounts {
    pub missing_in_current: usize,
    pub extra_in_current: usize,
    pub field_mismatches: usize,
    pub rule_drift: usize,
    pub duplicate_ids: usize,
}

/// Compares unit sets
#[derive(Debug, Clone)]
pub struct Differ {
    factions: FactionTable,
    rule_matching: RuleMatching,
}

impl Differ {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self::with_factions(FactionTable::from_vocabulary(vocabulary))
    }

    pub fn with_factions(factions: FactionTable) -> Self {
        Self {
            factions,
            rule_matching: RuleMatching::default(),
        }
    }

    /// Set keyword / special-rule strictness
    pub fn rule_matching(mut self, rule_matching: RuleMatching) -> Self {
        self.rule_matching = rule_matching;
        self
    }

    /// Compare a CSV-derived set against the current set
    pub fn diff(
        &self,
        csv_units: &[CanonicalUnit],
        current_units: &[CanonicalUnit],
    ) -> ValidationReport {
        let csv_keys: Vec<MatchKey> = csv_units.iter().map(|u| self.key(u)).collect();
        let current_keys: Vec<MatchKey> = current_units.iter().map(|u| self.key(u)).collect();
        let csv_index = UnitIndex::build(&csv_keys);
        let current_index = UnitIndex::build(&current_keys);

        let mut report = ValidationReport::default();

        for (unit, key) in csv_units.iter().zip(&csv_keys) {
            match current_index.find(key) {
                Some(i) => self.compare_pair(unit, &current_units[i], &mut report),
                None => report.missing_in_current.push(unit.clone()),
            }
        }

        for (unit, key) in current_units.iter().zip(&current_keys) {
            if csv_index.find(key).is_none() {
                report.extra_in_current.push(unit.clone());
            }
        }

        report.duplicate_ids = duplicate_ids(&csv_keys);

        debug!(
            csv = csv_units.len(),
            current = current_units.len(),
            missing = report.missing_in_current.len(),
            extra = report.extra_in_current.len(),
            mismatches = report.field_mismatches.len(),
            "diffed unit sets"
        );

        report
    }

    fn key(&self, unit: &CanonicalUnit) -> MatchKey {
        let mut factions: Vec<String> = unit
            .faction_labels()
            .map(|f| self.factions.canonicalize(f))
            .collect();
        factions.dedup();

        MatchKey {
            id: unit.id.clone(),
            name: unit.name.trim().to_lowercase(),
            factions,
        }
    }

    fn compare_pair(
        &self,
        csv: &CanonicalUnit,
        current: &CanonicalUnit,
        report: &mut ValidationReport,
    ) {
        for field in TrackedField::ALL {
            let csv_value = field.value_of(csv);
            let current_value = field.value_of(current);
            if csv_value != current_value {
                report.field_mismatches.push(FieldMismatch {
                    unit_name: csv.name.clone(),
                    field,
                    csv_value,
                    current_value,
                });
            }
        }

        if self.rule_matching == RuleMatching::Off {
            return;
        }

        let csv_tags: Vec<&String> = csv.all_tags().collect();
        let current_tags: Vec<&String> = current.all_tags().collect();
        self.push_drift(report, csv, ListField::Keywords, &csv_tags, &current_tags);

        let csv_rules: Vec<&String> = csv.special_rules.iter().collect();
        let current_rules: Vec<&String> = current.special_rules.iter().collect();
        self.push_drift(report, csv, ListField::SpecialRules, &csv_rules, &current_rules);
    }

    fn push_drift(
        &self,
        report: &mut ValidationReport,
        csv: &CanonicalUnit,
        field: ListField,
        csv_tokens: &[&String],
        current_tokens: &[&String],
    ) {
        let only_in_csv = self.unmatched(csv_tokens, current_tokens);
        let only_in_current = self.unmatched(current_tokens, csv_tokens);

        if !only_in_csv.is_empty() || !only_in_current.is_empty() {
            report.rule_drift.push(RuleDrift {
                unit_name: csv.name.clone(),
                field,
                only_in_csv,
                only_in_current,
            });
        }
    }

    fn unmatched(&self, tokens: &[&String], other: &[&String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !other.iter().any(|o| self.rule_matching.equivalent(t, o)))
            .map(|t| t.to_string())
            .collect()
    }
}

impl Default for Differ {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

/// Diff with the default vocabulary and loose rule matching
pub fn diff(csv_units: &[CanonicalUnit], current_units: &[CanonicalUnit]) -> ValidationReport {
    Differ::default().diff(csv_units, current_units)
}

/// Join keys of one unit
struct MatchKey {
    id: String,
    name: String,
    factions: Vec<String>,
}

/// First-occurrence lookup by id and by (name, faction)
struct UnitIndex<'k> {
    by_id: HashMap<&'k str, usize>,
    by_name: HashMap<(&'k str, &'k str), usize>,
}

impl<'k> UnitIndex<'k> {
    fn build(keys: &'k [MatchKey]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for (i, key) in keys.iter().enumerate() {
            if !key.id.is_empty() {
                by_id.entry(key.id.as_str()).or_insert(i);
            }
            if !key.name.is_empty() {
                for faction in &key.factions {
                    by_name.entry((key.name.as_str(), faction.as_str())).or_insert(i);
                }
            }
        }

        Self { by_id, by_name }
    }

    /// Id match wins; otherwise the earliest name+faction match
    fn find(&self, key: &MatchKey) -> Option<usize> {
        if let Some(&i) = self.by_id.get(key.id.as_str()) {
            return Some(i);
        }
        key.factions
            .iter()
            .filter_map(|f| self.by_name.get(&(key.name.as_str(), f.as_str())).copied())
            .min()
    }
}

fn duplicate_ids(keys: &[MatchKey]) -> Vec<String> {
    let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    for key in keys {
        let faction = key.factions.first().map(String::as_str);
        if !seen.insert((key.id.as_str(), faction)) && !duplicates.contains(&key.id) {
            duplicates.push(key.id.clone());
        }
    }

    duplicates
}
