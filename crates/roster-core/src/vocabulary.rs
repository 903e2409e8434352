//! Vocabulary configuration: known characteristics, faction aliases, header aliases
//!
//! Stored as JSON. Keys missing from a file fall back to the built-in defaults.

use crate::error::{Error, Result};
use crate::faction::DEFAULT_FACTION_ALIASES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Built-in known characteristics
pub const DEFAULT_CHARACTERISTICS: &[&str] = &[
    "Infantry",
    "Cavalry",
    "Brute",
    "Monster",
    "Chariot",
    "Titan",
    "Swarm",
    "Character",
    "High Command",
    "Companion",
];

/// Immutable reference data handed to the normalizer and differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vocabulary {
    /// Tokens classified as characteristics rather than keywords
    pub known_characteristics: Vec<String>,
    /// Faction name variant -> canonical faction id
    pub faction_aliases: BTreeMap<String, String>,
    /// Semantic field key (e.g. "pointsCost") -> extra accepted header names
    pub header_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            known_characteristics: DEFAULT_CHARACTERISTICS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            faction_aliases: DEFAULT_FACTION_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            header_aliases: BTreeMap::new(),
        }
    }
}

impl Vocabulary {
    /// Vocabulary with a custom characteristic list and default everything else
    pub fn with_characteristics<I, S>(characteristics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_characteristics: characteristics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether a token is a known characteristic (case-insensitive)
    pub fn is_known_characteristic(&self, token: &str) -> bool {
        let token = token.trim();
        self.known_characteristics
            .iter()
            .any(|c| c.eq_ignore_ascii_case(token))
    }

    /// Extra header aliases configured for a field key
    pub fn extra_headers(&self, field_key: &str) -> &[String] {
        self.header_aliases
            .get(field_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Load a vocabulary from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Save the vocabulary to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
