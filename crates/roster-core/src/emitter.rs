//! Source emitter: canonical units -> generated unit data files
//!
//! Output is a TypeScript module holding one exported array. The array
//! literal itself is plain JSON, so generated files can be read back with
//! [`parse_emitted_source`] and used as a "current" unit set.

use crate::error::{Error, Result};
use crate::unit::{image_url_for, CanonicalUnit, UnitType};
use serde::{Deserialize, Serialize};

/// Header line written at the top of every generated file
pub const GENERATED_HEADER: &str = "// Generated from the unit CSV export. Do not edit by hand.";

/// Import line for the unit record type
const TYPE_IMPORT: &str = "import type { Unit } from \"../../types/unit\";";

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedFile {
    pub category: UnitType,
    pub file_name: String,
    pub content: String,
}

/// Record layout of a generated unit; field order is the output order
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmittedUnit<'a> {
    id: &'a str,
    name: &'a str,
    points_cost: u32,
    faction: &'a str,
    keywords: Vec<&'a str>,
    high_command: bool,
    availability: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    special_rules: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    companion: Option<&'a str>,
    image_url: String,
}

impl<'a> EmittedUnit<'a> {
    fn new(unit: &'a CanonicalUnit, faction_id: &'a str) -> Self {
        Self {
            id: &unit.id,
            name: &unit.name,
            points_cost: unit.points_cost,
            faction: faction_id,
            keywords: unit.all_tags().map(String::as_str).collect(),
            high_command: unit.high_command,
            availability: unit.availability,
            command: unit.command,
            special_rules: unit.special_rules.iter().map(String::as_str).collect(),
            companion: unit.companion_of.as_deref(),
            image_url: image_url_for(&unit.id),
        }
    }
}

/// Render units as a generated source file for a faction and category name
pub fn emit(units: &[CanonicalUnit], faction_id: &str, category: &str) -> Result<String> {
    let category: UnitType = category.parse()?;
    emit_category(units, faction_id, category)
}

/// Render the units of one category as a generated source file
///
/// Units of other categories are skipped; the rest keep their input order.
pub fn emit_category(
    units: &[CanonicalUnit],
    faction_id: &str,
    category: UnitType,
) -> Result<String> {
    let records: Vec<EmittedUnit> = units
        .iter()
        .filter(|u| u.unit_type == category)
        .map(|u| EmittedUnit::new(u, faction_id))
        .collect();
    let array = serde_json::to_string_pretty(&records)?;

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push('\n');
    out.push_str(&format!("// faction: {}, category: {}\n", faction_id, category));
    out.push('\n');
    out.push_str(TYPE_IMPORT);
    out.push_str("\n\n");
    out.push_str(&format!(
        "export const {}: Unit[] = {};\n",
        export_name(faction_id, category),
        array
    ));
    Ok(out)
}

/// Render every non-empty category of one faction
///
/// Units keep their input order within each category.
pub fn emit_faction(units: &[CanonicalUnit], faction_id: &str) -> Result<Vec<EmittedFile>> {
    let mut files = Vec::new();

    for category in UnitType::ALL {
        if !units.iter().any(|u| u.unit_type == category) {
            continue;
        }

        files.push(EmittedFile {
            category,
            file_name: file_name(faction_id, category),
            content: emit_category(units, faction_id, category)?,
        });
    }

    Ok(files)
}

/// Units belonging to a canonical faction id, in input order
pub fn select_faction(units: &[CanonicalUnit], faction_id: &str) -> Vec<CanonicalUnit> {
    units
        .iter()
        .filter(|u| u.faction_id == faction_id)
        .cloned()
        .collect()
}

/// File name for a faction/category pair
pub fn file_name(faction_id: &str, category: UnitType) -> String {
    format!("{}_{}.ts", faction_id, category.as_str().replace('-', "_"))
}

/// Read units back out of generated source text
pub fn parse_emitted_source(source: &str) -> Result<Vec<CanonicalUnit>> {
    let start = source
        .find("= [")
        .map(|i| i + 2)
        .ok_or_else(|| Error::MalformedSource("no unit array found".to_string()))?;
    let end = source
        .rfind(']')
        .filter(|&e| e > start)
        .ok_or_else(|| Error::MalformedSource("unterminated unit array".to_string()))?;

    serde_json::from_str(&source[start..=end]).map_err(Error::Json)
}

/// camelCase export identifier, e.g. `scionsOfTaldabaothTroops`
fn export_name(faction_id: &str, category: UnitType) -> String {
    let suffix = match category {
        UnitType::Troop => "Troops",
        UnitType::Character => "Characters",
        UnitType::HighCommand => "HighCommand",
        UnitType::Companion => "Companions",
    };

    let mut name = String::new();
    for (i, word) in faction_id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            name.push_str(&word.to_ascii_lowercase());
        } else {
            name.push_str(&capitalize(word));
        }
    }

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "units");
    }
    name.push_str(suffix);
    name
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        None => String::new(),
    }
}
