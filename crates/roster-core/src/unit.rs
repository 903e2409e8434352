//! Canonical unit representation shared by the CSV and current-data sides

use crate::emitter::parse_emitted_source;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Unit category, used for classification and for partitioning emitted files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitType {
    #[default]
    Troop,
    Character,
    HighCommand,
    Companion,
}

impl UnitType {
    /// All categories in emission order
    pub const ALL: [UnitType; 4] = [
        UnitType::Troop,
        UnitType::Character,
        UnitType::HighCommand,
        UnitType::Companion,
    ];

    /// Category name as used in file names and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Troop => "troop",
            UnitType::Character => "character",
            UnitType::HighCommand => "high-command",
            UnitType::Companion => "companion",
        }
    }

    /// Parse a loosely written type cell ("Troops", "High Command", "character")
    pub fn parse_loose(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "troop" | "troops" | "regiment" | "regiments" => Some(UnitType::Troop),
            "character" | "characters" => Some(UnitType::Character),
            "highcommand" => Some(UnitType::HighCommand),
            "companion" | "companions" => Some(UnitType::Companion),
            _ => None,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UnitType::parse_loose(s).ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// One game unit, independent of whether it came from CSV or from stored data
///
/// Stored records may carry their faction under `factionId` or under the
/// legacy `faction` key; both are kept so the differ can try each.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalUnit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub faction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(default)]
    pub unit_type: UnitType,
    #[serde(default)]
    pub points_cost: u32,
    #[serde(default)]
    pub availability: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<u32>,
    #[serde(default)]
    pub high_command: bool,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub special_rules: Vec<String>,
    #[serde(default, alias = "companion", skip_serializing_if = "Option::is_none")]
    pub companion_of: Option<String>,
}

impl CanonicalUnit {
    /// Every faction identifier this record carries, non-empty ones only
    pub fn faction_labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.faction_id.as_str())
            .chain(self.faction.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The faction id to group by: `faction_id`, else the legacy field
    pub fn primary_faction(&self) -> &str {
        self.faction_labels().next().unwrap_or("")
    }

    /// Characteristics followed by keywords, the unit's full tag list
    pub fn all_tags(&self) -> impl Iterator<Item = &String> {
        self.characteristics.iter().chain(self.keywords.iter())
    }

    /// Card image path, always derived from the id
    pub fn image_url(&self) -> String {
        image_url_for(&self.id)
    }
}

/// Directory every unit card image lives under
pub const IMAGE_DIR: &str = "/images/units";

/// Card image path for a unit id
pub fn image_url_for(id: &str) -> String {
    format!("{}/{}_card.jpg", IMAGE_DIR, id)
}

/// Load a "current" unit set
///
/// `.ts`/`.js` files are read as previously generated source; anything else
/// as a JSON array of unit records.
pub fn load_current_units<P: AsRef<Path>>(path: P) -> Result<Vec<CanonicalUnit>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let generated = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "ts" | "js"));
    if generated {
        parse_emitted_source(&content)
    } else {
        parse_current_units(&content)
    }
}

/// Parse a "current" unit set from JSON text
pub fn parse_current_units(content: &str) -> Result<Vec<CanonicalUnit>> {
    serde_json::from_str(content).map_err(Error::Json)
}
