//! Faction name canonicalization
//!
//! The canonical faction id is the join key between CSV rows and stored
//! units, so the mapping must be total and deterministic.

use crate::vocabulary::Vocabulary;
use std::collections::BTreeMap;

/// Built-in spelling variants, keyed by normalized lookup form
pub const DEFAULT_FACTION_ALIASES: &[(&str, &str)] = &[
    ("scions of taldabaoth", "scions-of-taldabaoth"),
    ("scions of taldaboath", "scions-of-taldabaoth"),
    ("scions of taldabeoth", "scions-of-taldabaoth"),
    ("scions of taldeboath", "scions-of-taldabaoth"),
    ("scions", "scions-of-taldabaoth"),
];

/// Lookup table from faction name variants to canonical ids
#[derive(Debug, Clone, Default)]
pub struct FactionTable {
    aliases: BTreeMap<String, String>,
}

impl FactionTable {
    /// Build a table from (variant, canonical id) pairs
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let aliases = pairs
            .into_iter()
            .map(|(k, v)| (lookup_key(k.as_ref()), v.into()))
            .collect();
        Self { aliases }
    }

    /// Table built from a vocabulary's alias map
    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        Self::new(vocabulary.faction_aliases.iter())
    }

    /// Resolve a raw faction name to its canonical id
    ///
    /// Unknown names fall back to a lowercased, hyphenated form of themselves.
    pub fn canonicalize(&self, raw: &str) -> String {
        let key = lookup_key(raw);
        match self.aliases.get(&key) {
            Some(id) => id.clone(),
            None => key.replace(' ', "-"),
        }
    }

    /// Whether two raw faction labels resolve to the same id
    pub fn same_faction(&self, a: &str, b: &str) -> bool {
        self.canonicalize(a) == self.canonicalize(b)
    }

    /// Number of known variants
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table has no variants
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Canonicalize with the built-in variant table
pub fn canonicalize_faction(raw: &str) -> String {
    FactionTable::new(DEFAULT_FACTION_ALIASES.iter().copied()).canonicalize(raw)
}

/// Lowercase, trim, collapse whitespace runs to one space
fn lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_variants_share_id() {
        assert_eq!(canonicalize_faction("Scions of Taldabaoth"), "scions-of-taldabaoth");
        assert_eq!(canonicalize_faction("Scions of Taldaboath"), "scions-of-taldabaoth");
        assert_eq!(canonicalize_faction("  SCIONS   of taldabaoth "), "scions-of-taldabaoth");
    }

    #[test]
    fn test_unknown_falls_back_to_hyphenated() {
        assert_eq!(canonicalize_faction("Iron Host"), "iron-host");
        assert_eq!(canonicalize_faction("iron-host"), "iron-host");
        assert_eq!(canonicalize_faction(""), "");
    }

    #[test]
    fn test_canonical_id_is_fixed_point() {
        let table = FactionTable::new(DEFAULT_FACTION_ALIASES.iter().copied());
        let id = table.canonicalize("Scions of Taldaboath");
        assert_eq!(table.canonicalize(&id), id);
        assert!(table.same_faction("scions-of-taldabaoth", "Scions"));
    }

    #[test]
    fn test_custom_table() {
        let table = FactionTable::new([("The Iron Hosts", "iron-host")]);
        assert_eq!(table.canonicalize("the iron  hosts"), "iron-host");
        assert_eq!(table.len(), 1);
    }
}
