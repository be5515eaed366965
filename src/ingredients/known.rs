use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::parse::normalize_ingredient;

/// Reference entry from the contact-dermatitis allergen database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KnownAllergen {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub where_found: Option<String>,
    #[serde(default)]
    pub product_categories: Vec<String>,
}

/// Known allergens in table order. Lookups return the first row that matches.
#[derive(Debug, Clone, Default)]
pub struct KnownAllergenTable {
    rows: Vec<(String, KnownAllergen)>,
}

impl KnownAllergenTable {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = KnownAllergen>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| (normalize_ingredient(&row.name), row))
                .collect(),
        }
    }

    /// First allergen whose normalized name is one of `names`.
    pub fn find_any(&self, names: &BTreeSet<String>) -> Option<&KnownAllergen> {
        self.rows
            .iter()
            .find(|(normalized, _)| names.contains(normalized))
            .map(|(_, row)| row)
    }

    pub fn find(&self, name: &str) -> Option<&KnownAllergen> {
        let normalized = normalize_ingredient(name);
        self.rows
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, row)| row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
pub(crate) fn allergen(name: &str, category: &str, description: &str) -> KnownAllergen {
    KnownAllergen {
        name: name.into(),
        category: Some(category.into()),
        description: Some(description.into()),
        where_found: None,
        product_categories: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> KnownAllergenTable {
        KnownAllergenTable::new(vec![
            allergen("Fragrance", "Sensitizer", "Can cause allergic reactions"),
            allergen("Parfum", "Sensitizer", "Can cause allergic reactions"),
            allergen("Lanolin", "Moisturizer", "Reacts in sensitive skin"),
        ])
    }

    #[test]
    fn find_any_prefers_table_order() {
        let t = table();
        let names: BTreeSet<String> = ["parfum", "fragrance"].iter().map(|s| s.to_string()).collect();
        assert_eq!(t.find_any(&names).map(|a| a.name.as_str()), Some("Fragrance"));
    }

    #[test]
    fn find_is_case_insensitive() {
        let t = table();
        assert_eq!(t.find("  LANOLIN").map(|a| a.category.as_deref()), Some(Some("Moisturizer")));
        assert!(t.find("Water").is_none());
        assert_eq!(t.len(), 3);
    }
}
