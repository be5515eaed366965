use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::parse::normalize_ingredient;

/// One row of the synonym table. Pairs are undirected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IngredientSynonym {
    pub primary_name: String,
    pub synonym: String,
}

/// In-memory synonym lookup.
///
/// Resolution is a single hop: a name expands to the names it is directly
/// paired with, never to the partners of those partners. With pairs
/// `(Methylparaben, Paraben)` and `(Propylparaben, Paraben)`, `Paraben`
/// expands to all three while `Methylparaben` only reaches `Paraben`.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    direct: HashMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = IngredientSynonym>,
    {
        let mut direct: HashMap<String, BTreeSet<String>> = HashMap::new();
        for row in rows {
            let primary = normalize_ingredient(&row.primary_name);
            let synonym = normalize_ingredient(&row.synonym);
            for key in [&primary, &synonym] {
                let entry = direct.entry(key.clone()).or_default();
                entry.insert(primary.clone());
                entry.insert(synonym.clone());
            }
        }
        Self { direct }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(pairs.iter().map(|(p, s)| IngredientSynonym {
            primary_name: (*p).to_string(),
            synonym: (*s).to_string(),
        }))
    }

    /// Every normalized name equivalent to `name`, the normalized input
    /// included.
    pub fn synonyms_of(&self, name: &str) -> BTreeSet<String> {
        let normalized = normalize_ingredient(name);
        let mut names = self.direct.get(&normalized).cloned().unwrap_or_default();
        names.insert(normalized);
        names
    }

    /// Number of distinct names that have at least one synonym.
    pub fn len(&self) -> usize {
        self.direct.len()
    }
}
