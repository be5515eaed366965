use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::{
    parse::{normalize_ingredient, parse_ingredients},
    synonyms::SynonymTable,
};

/// Ingredient seen only in products the user reacted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialAllergen {
    pub name: String,
    /// Allergic products whose ingredient text mentions `name`.
    pub count: usize,
}

fn expanded_names<S: AsRef<str>>(products: &[S], synonyms: &SynonymTable) -> BTreeSet<String> {
    products
        .iter()
        .flat_map(|text| parse_ingredients(text.as_ref()))
        .flat_map(|ing| synonyms.synonyms_of(&ing))
        .collect()
}

/// Compares the raw ingredient texts of allergic and safe products and
/// returns ingredients that only ever show up on the allergic side,
/// most frequent first.
///
/// Without at least one product on each side there is nothing to contrast
/// and the result is empty.
pub fn detect_potential_allergens<A, S>(
    allergic: &[A],
    safe: &[S],
    synonyms: &SynonymTable,
) -> Vec<PotentialAllergen>
where
    A: AsRef<str>,
    S: AsRef<str>,
{
    if allergic.is_empty() || safe.is_empty() {
        return Vec::new();
    }

    let allergic_names = expanded_names(allergic, synonyms);
    let safe_names = expanded_names(safe, synonyms);
    let suspects: HashSet<&String> = allergic_names.difference(&safe_names).collect();
    if suspects.is_empty() {
        return Vec::new();
    }

    let lowered: Vec<String> = allergic.iter().map(|t| t.as_ref().to_lowercase()).collect();

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for text in allergic {
        for ing in parse_ingredients(text.as_ref()) {
            let hit = synonyms
                .synonyms_of(&ing)
                .iter()
                .any(|name| suspects.contains(name));
            if !hit || !seen.insert(normalize_ingredient(&ing)) {
                continue;
            }
            let needle = ing.to_lowercase();
            let count = lowered.iter().filter(|t| t.contains(&needle)).count();
            result.push(PotentialAllergen { name: ing, count });
        }
    }

    // stable: equal counts keep first-seen order
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}
