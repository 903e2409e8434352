//! Row normalizer: raw CSV record -> CanonicalUnit

use crate::faction::FactionTable;
use crate::table::RowRecord;
use crate::tokenizer::parse_field;
use crate::unit::{CanonicalUnit, UnitType};
use crate::vocabulary::Vocabulary;

/// Semantic columns of a unit export
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitField {
    Name,
    FactionId,
    Faction,
    UnitType,
    PointsCost,
    Availability,
    Command,
    HighCommand,
    Characteristics,
    Keywords,
    SpecialRules,
    CompanionOf,
}

impl UnitField {
    pub const ALL: [UnitField; 12] = [
        UnitField::Name,
        UnitField::FactionId,
        UnitField::Faction,
        UnitField::UnitType,
        UnitField::PointsCost,
        UnitField::Availability,
        UnitField::Command,
        UnitField::HighCommand,
        UnitField::Characteristics,
        UnitField::Keywords,
        UnitField::SpecialRules,
        UnitField::CompanionOf,
    ];

    /// Programmatic key, also used for vocabulary header aliases
    pub fn key(&self) -> &'static str {
        match self {
            UnitField::Name => "name",
            UnitField::FactionId => "factionId",
            UnitField::Faction => "faction",
            UnitField::UnitType => "unitType",
            UnitField::PointsCost => "pointsCost",
            UnitField::Availability => "availability",
            UnitField::Command => "command",
            UnitField::HighCommand => "highCommand",
            UnitField::Characteristics => "characteristics",
            UnitField::Keywords => "keywords",
            UnitField::SpecialRules => "specialRules",
            UnitField::CompanionOf => "companionOf",
        }
    }

    /// Built-in accepted headers, display name first
    pub fn default_headers(&self) -> &'static [&'static str] {
        match self {
            UnitField::Name => &["Unit Name", "name", "Unit"],
            UnitField::FactionId => &["Faction ID", "factionId"],
            UnitField::Faction => &["Faction Name", "faction"],
            UnitField::UnitType => &["Unit Type", "unitType", "type"],
            UnitField::PointsCost => &["Points Cost", "pointsCost", "points", "cost"],
            UnitField::Availability => &["Availability", "availability", "avail"],
            UnitField::Command => &["Command", "command"],
            UnitField::HighCommand => &["High Command", "highCommand"],
            UnitField::Characteristics => &["Characteristics", "characteristics"],
            UnitField::Keywords => &["Keywords", "keywords"],
            UnitField::SpecialRules => &["Special Rules", "specialRules", "rules"],
            UnitField::CompanionOf => &["Companion Of", "companionOf", "companion"],
        }
    }
}

/// Normalizes raw rows using a vocabulary
#[derive(Debug, Clone)]
pub struct RowNormalizer<'a> {
    vocabulary: &'a Vocabulary,
    factions: FactionTable,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self {
            vocabulary,
            factions: FactionTable::from_vocabulary(vocabulary),
        }
    }

    /// Faction table built from the vocabulary
    pub fn factions(&self) -> &FactionTable {
        &self.factions
    }

    /// Cell for a semantic field, trying built-in then configured headers
    pub fn field<'r>(&self, row: &'r RowRecord, field: UnitField) -> Option<&'r str> {
        row.lookup(field.default_headers())
            .or_else(|| row.lookup(self.vocabulary.extra_headers(field.key())))
    }

    /// Build a canonical unit from a row that has a real name
    pub fn normalize_row(&self, row: &RowRecord) -> CanonicalUnit {
        let name = self.field(row, UnitField::Name).unwrap_or("").to_string();

        let faction_raw = self
            .field(row, UnitField::FactionId)
            .or_else(|| self.field(row, UnitField::Faction))
            .unwrap_or("");
        let faction_id = self.factions.canonicalize(faction_raw);

        let mut tokens = self.tokens(row, UnitField::Characteristics);
        tokens.extend(self.tokens(row, UnitField::Keywords));
        let (characteristics, keywords) = self.partition_tokens(tokens);

        let special_rules = dedup(self.tokens(row, UnitField::SpecialRules));

        let companion_of = self
            .field(row, UnitField::CompanionOf)
            .filter(|v| !is_flag_value(v) && !is_placeholder_name(v))
            .map(str::to_string);

        let high_command = self
            .field(row, UnitField::HighCommand)
            .map(parse_flag)
            .unwrap_or(false);

        let unit_type = infer_unit_type(
            self.field(row, UnitField::UnitType),
            companion_of.is_some(),
            &characteristics,
            &keywords,
        );

        CanonicalUnit {
            id: slugify(&name),
            name,
            faction_id,
            faction: None,
            unit_type,
            points_cost: self.field(row, UnitField::PointsCost).map(parse_int).unwrap_or(0),
            availability: self
                .field(row, UnitField::Availability)
                .map(parse_int)
                .unwrap_or(0),
            command: self.field(row, UnitField::Command).and_then(parse_optional_int),
            high_command,
            characteristics,
            keywords,
            special_rules,
            companion_of,
        }
    }

    /// Split tokens into (characteristics, keywords) by vocabulary membership
    pub fn partition_tokens(&self, tokens: Vec<String>) -> (Vec<String>, Vec<String>) {
        dedup(tokens)
            .into_iter()
            .partition(|t| self.vocabulary.is_known_characteristic(t))
    }

    fn tokens(&self, row: &RowRecord, field: UnitField) -> Vec<String> {
        self.field(row, field).map(parse_field).unwrap_or_default()
    }
}

/// Stable id from a display name
///
/// Lowercase, drop anything outside `[a-z0-9]` and whitespace, then join
/// whitespace-separated words with single hyphens.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Leading base-10 digits of a cell, or 0
pub fn parse_int(s: &str) -> u32 {
    parse_optional_int(s).unwrap_or(0)
}

/// Leading base-10 digits of a cell, or None when there are none
pub fn parse_optional_int(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    digits.parse().ok()
}

/// "yes"/"true" (any case) -> true, anything else -> false
pub fn parse_flag(s: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
}

/// Yes/no style cell values, which never name a parent unit
fn is_flag_value(s: &str) -> bool {
    const FLAGS: &[&str] = &["yes", "no", "true", "false", "y", "n", "-", "none", "n/a"];
    let s = s.trim();
    FLAGS.iter().any(|f| s.eq_ignore_ascii_case(f))
}

/// Name cells that mark a blank export row
pub fn is_placeholder_name(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == "null" || name == "undefined"
}

fn infer_unit_type(
    explicit: Option<&str>,
    has_parent: bool,
    characteristics: &[String],
    keywords: &[String],
) -> UnitType {
    if let Some(t) = explicit.and_then(UnitType::parse_loose) {
        return t;
    }
    if has_parent {
        return UnitType::Companion;
    }

    let has_tag = |tag: &str| {
        characteristics
            .iter()
            .chain(keywords)
            .any(|t| t.eq_ignore_ascii_case(tag))
    };
    if has_tag("High Command") {
        UnitType::HighCommand
    } else if has_tag("Character") {
        UnitType::Character
    } else {
        UnitType::Troop
    }
}

/// Drop repeated tokens, keeping the first occurrence
fn dedup(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RowRecord {
        RowRecord::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Flamecobs"), "flamecobs");
        assert_eq!(slugify("Mounted Hetman"), "mounted-hetman");
        assert_eq!(slugify("  Mounted   HETMAN "), "mounted-hetman");
        assert_eq!(slugify("Master Keörl"), "master-kerl");
        assert_eq!(slugify("Master Keörl"), slugify("Master Keörl"));
        assert_eq!(slugify("Gor'ak the Red"), "gorak-the-red");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("20"), 20);
        assert_eq!(parse_int(" 20 pts"), 20);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("n/a"), 0);
        assert_eq!(parse_optional_int(""), None);
        assert_eq!(parse_optional_int("0"), Some(0));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_placeholder_names() {
        assert!(is_placeholder_name(""));
        assert!(is_placeholder_name(" null "));
        assert!(is_placeholder_name("undefined"));
        assert!(!is_placeholder_name("Nullbringer"));
    }

    #[test]
    fn test_normalize_display_headers() {
        let vocab = Vocabulary::default();
        let normalizer = RowNormalizer::new(&vocab);
        let unit = normalizer.normalize_row(&row(&[
            ("Unit Name", "Flamecobs"),
            ("Faction Name", "Scions of Taldaboath"),
            ("Points Cost", "20"),
            ("Availability", "1"),
            ("Keywords", "[Infantry, Projectile, Red Cap]"),
            ("Special Rules", "Dispel (BLK, BLK), Scout"),
        ]));

        assert_eq!(unit.id, "flamecobs");
        assert_eq!(unit.faction_id, "scions-of-taldabaoth");
        assert_eq!(unit.points_cost, 20);
        assert_eq!(unit.availability, 1);
        assert_eq!(unit.command, None);
        assert!(!unit.high_command);
        assert_eq!(unit.unit_type, UnitType::Troop);
        assert_eq!(unit.characteristics, vec!["Infantry"]);
        assert_eq!(unit.keywords, vec!["Projectile", "Red Cap"]);
        assert_eq!(unit.special_rules, vec!["Dispel (BLK, BLK)", "Scout"]);
    }

    #[test]
    fn test_normalize_programmatic_headers() {
        let vocab = Vocabulary::default();
        let normalizer = RowNormalizer::new(&vocab);
        let unit = normalizer.normalize_row(&row(&[
            ("name", "Mounted Hetman"),
            ("factionId", "scions-of-taldabaoth"),
            ("pointsCost", "140"),
            ("command", "0"),
            ("highCommand", "yes"),
            ("characteristics", "Character"),
        ]));

        assert_eq!(unit.id, "mounted-hetman");
        assert_eq!(unit.command, Some(0));
        assert!(unit.high_command);
        assert_eq!(unit.unit_type, UnitType::Character);
    }

    #[test]
    fn test_characteristic_partition_ignores_source_column() {
        let vocab = Vocabulary::with_characteristics(["Infantry", "Brute"]);
        let normalizer = RowNormalizer::new(&vocab);
        let unit = normalizer.normalize_row(&row(&[
            ("name", "Gore Hounds"),
            ("characteristics", "Hunter"),
            ("keywords", "brute, Hunter"),
        ]));

        assert_eq!(unit.characteristics, vec!["brute"]);
        assert_eq!(unit.keywords, vec!["Hunter"]);
    }

    #[test]
    fn test_unit_type_inference() {
        let vocab = Vocabulary::default();
        let normalizer = RowNormalizer::new(&vocab);

        let hc = normalizer.normalize_row(&row(&[
            ("name", "Warlord"),
            ("keywords", "High Command, Character"),
        ]));
        assert_eq!(hc.unit_type, UnitType::HighCommand);

        let companion =
            normalizer.normalize_row(&row(&[("name", "Wolf"), ("Companion Of", "Warlord")]));
        assert_eq!(companion.unit_type, UnitType::Companion);
        assert_eq!(companion.companion_of.as_deref(), Some("Warlord"));

        let flagged =
            normalizer.normalize_row(&row(&[("Unit Name", "Flamecobs"), ("Companion", "no")]));
        assert_eq!(flagged.unit_type, UnitType::Troop);
        assert_eq!(flagged.companion_of, None);

        let named = normalizer.normalize_row(&row(&[("name", "Wolf"), ("companion", "Warlord")]));
        assert_eq!(named.unit_type, UnitType::Companion);
        assert_eq!(named.companion_of.as_deref(), Some("Warlord"));

        let explicit = normalizer.normalize_row(&row(&[
            ("name", "Warlord"),
            ("Unit Type", "Troops"),
            ("keywords", "Character"),
        ]));
        assert_eq!(explicit.unit_type, UnitType::Troop);
    }

    #[test]
    fn test_configured_header_alias() {
        let json = r#"{"headerAliases": {"pointsCost": ["Pts"]}}"#;
        let vocab: Vocabulary = serde_json::from_str(json).unwrap();
        let normalizer = RowNormalizer::new(&vocab);
        let unit = normalizer.normalize_row(&row(&[("name", "Flamecobs"), ("PTS", "20")]));

        assert_eq!(unit.points_cost, 20);
    }
}
