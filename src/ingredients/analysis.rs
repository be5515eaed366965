use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::{
    cross_ref::{detect_potential_allergens, PotentialAllergen},
    known::KnownAllergenTable,
    parse::normalize_ingredient,
    synonyms::SynonymTable,
};
use crate::allergens::Severity;

/// A personal allergen as the analyzer sees it.
#[derive(Debug, Clone)]
pub struct PersonalAllergen {
    pub name: String,
    pub severity: Severity,
}

/// Everything known about one user that a scan is checked against.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    /// In definition order.
    pub personal: Vec<PersonalAllergen>,
    pub allergic_products: Vec<String>,
    pub safe_products: Vec<String>,
    pub synonyms: SynonymTable,
    pub known: KnownAllergenTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundAllergen {
    pub name: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialMatch {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllergenWarning {
    pub name: String,
    /// Reference entry that matched, which may be a synonym of `name`.
    pub allergen_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub where_found: Option<String>,
    pub product_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub allergens_found: Vec<FoundAllergen>,
    pub potential_allergens: Vec<PotentialMatch>,
    pub warnings: Vec<AllergenWarning>,
    pub safe_ingredients: Vec<String>,
}

impl AnalysisReport {
    pub fn is_clear(&self) -> bool {
        self.allergens_found.is_empty()
            && self.potential_allergens.is_empty()
            && self.warnings.is_empty()
    }
}

impl AnalysisContext {
    /// Severity of the first personal allergen whose own name is one of
    /// `names`. A match reached only through the allergen's synonyms has no
    /// declared severity.
    fn personal_severity(&self, names: &BTreeSet<String>) -> Severity {
        self.personal
            .iter()
            .find(|a| names.contains(&normalize_ingredient(&a.name)))
            .map_or(Severity::Unknown, |a| a.severity)
    }

    pub fn potential_allergens(&self) -> Vec<PotentialAllergen> {
        detect_potential_allergens(&self.allergic_products, &self.safe_products, &self.synonyms)
    }

    /// Classifies each ingredient, in order, into exactly one bucket:
    /// personal allergen, cross-referenced suspect, known allergen, or safe.
    pub fn analyze<S: AsRef<str>>(&self, ingredients: &[S]) -> AnalysisReport {
        let personal: BTreeSet<String> = self
            .personal
            .iter()
            .flat_map(|a| self.synonyms.synonyms_of(&a.name))
            .collect();

        let mut suspects: HashMap<String, usize> = HashMap::new();
        for p in self.potential_allergens() {
            suspects.entry(normalize_ingredient(&p.name)).or_insert(p.count);
        }

        let mut report = AnalysisReport::default();
        for ingredient in ingredients {
            let ingredient = ingredient.as_ref();
            let names = self.synonyms.synonyms_of(ingredient);

            if !personal.is_disjoint(&names) {
                report.allergens_found.push(FoundAllergen {
                    name: ingredient.to_string(),
                    severity: self.personal_severity(&names),
                });
                continue;
            }

            if let Some(count) = suspects.get(&normalize_ingredient(ingredient)) {
                report.potential_allergens.push(PotentialMatch {
                    name: ingredient.to_string(),
                    reason: format!(
                        "Found in {} allergic product(s) but not in safe products",
                        count
                    ),
                });
                continue;
            }

            match self.known.find_any(&names) {
                Some(known) => report.warnings.push(AllergenWarning {
                    name: ingredient.to_string(),
                    allergen_name: known.name.clone(),
                    category: known.category.clone(),
                    description: known.description.clone(),
                    where_found: known.where_found.clone(),
                    product_categories: known.product_categories.clone(),
                }),
                None => report.safe_ingredients.push(ingredient.to_string()),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::known::allergen;

    fn reference() -> (SynonymTable, KnownAllergenTable) {
        let synonyms = SynonymTable::from_pairs(&[
            ("Tocopherol", "Vitamin E"),
            ("Fragrance", "Parfum"),
            ("Methylparaben", "Paraben"),
            ("Propylparaben", "Paraben"),
        ]);
        let known = KnownAllergenTable::new(vec![
            allergen("Fragrance", "Sensitizer", "Can cause allergic reactions"),
            allergen("Formaldehyde", "Preservative", "Known allergen and irritant"),
            allergen("Methylisothiazolinone", "Preservative", "Common cause of contact dermatitis"),
        ]);
        (synonyms, known)
    }

    fn context(personal: &[(&str, Severity)]) -> AnalysisContext {
        let (synonyms, known) = reference();
        AnalysisContext {
            personal: personal
                .iter()
                .map(|(name, severity)| PersonalAllergen {
                    name: name.to_string(),
                    severity: *severity,
                })
                .collect(),
            synonyms,
            known,
            ..Default::default()
        }
    }

    #[test]
    fn personal_allergen_wins_over_everything() {
        let ctx = context(&[("Fragrance", Severity::Severe)]);
        let report = ctx.analyze(&["Fragrance"]);
        assert_eq!(
            report.allergens_found,
            vec![FoundAllergen {
                name: "Fragrance".into(),
                severity: Severity::Severe
            }]
        );
        assert!(report.warnings.is_empty());
        assert!(report.safe_ingredients.is_empty());
    }

    #[test]
    fn personal_match_through_synonym_and_case() {
        let ctx = context(&[("Fragrance", Severity::Severe)]);
        for list in [["Water", "Parfum"], ["water", "FRAGRANCE"]] {
            let report = ctx.analyze(&list);
            assert_eq!(report.allergens_found.len(), 1);
            assert_eq!(report.allergens_found[0].severity, Severity::Severe);
            assert_eq!(report.safe_ingredients.len(), 1);
        }
    }

    #[test]
    fn severity_comes_from_allergen_named_in_ingredient_synonyms() {
        let ctx = context(&[
            ("Methylparaben", Severity::Mild),
            ("Paraben", Severity::Severe),
        ]);
        let report = ctx.analyze(&["Propylparaben"]);
        assert_eq!(report.allergens_found.len(), 1);
        assert_eq!(report.allergens_found[0].severity, Severity::Severe);
    }

    #[test]
    fn match_through_allergen_synonym_only_has_unknown_severity() {
        let ctx = context(&[("Methylparaben", Severity::Mild)]);
        let report = ctx.analyze(&["Propylparaben"]);
        assert_eq!(
            report.allergens_found,
            vec![FoundAllergen {
                name: "Propylparaben".into(),
                severity: Severity::Unknown
            }]
        );
    }

    #[test]
    fn first_declared_allergen_wins_among_named_matches() {
        let ctx = context(&[
            ("Parfum", Severity::Mild),
            ("Fragrance", Severity::Severe),
        ]);
        let report = ctx.analyze(&["Fragrance"]);
        assert_eq!(report.allergens_found[0].severity, Severity::Mild);
    }

    #[test]
    fn known_allergen_becomes_warning() {
        let ctx = context(&[]);
        let report = ctx.analyze(&["Water", "Methylisothiazolinone", "Glycerin"]);
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.name, "Methylisothiazolinone");
        assert_eq!(warning.category.as_deref(), Some("Preservative"));
        assert_eq!(report.safe_ingredients, vec!["Water", "Glycerin"]);
    }

    #[test]
    fn known_allergen_matched_by_synonym_reports_reference_name() {
        let ctx = context(&[]);
        let report = ctx.analyze(&["Parfum"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].name, "Parfum");
        assert_eq!(report.warnings[0].allergen_name, "Fragrance");
    }

    #[test]
    fn cross_referenced_suspect_is_flagged_before_known_lookup() {
        let mut ctx = context(&[]);
        ctx.allergic_products = vec!["Water, Formaldehyde, Lanolin".into()];
        ctx.safe_products = vec!["Water, Glycerin".into()];

        let report = ctx.analyze(&["Water", "lanolin", "Formaldehyde"]);
        let names: Vec<&str> = report.potential_allergens.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lanolin", "Formaldehyde"]);
        assert!(report.potential_allergens[0].reason.contains("1 allergic product"));
        assert!(report.warnings.is_empty());
        assert_eq!(report.safe_ingredients, vec!["Water"]);
    }

    #[test]
    fn every_ingredient_lands_in_exactly_one_bucket() {
        let mut ctx = context(&[("Fragrance", Severity::Moderate)]);
        ctx.allergic_products = vec!["Lanolin, Water".into()];
        ctx.safe_products = vec!["Water".into()];
        let input = ["Parfum", "Lanolin", "Formaldehyde", "Vitamin E", "Water"];
        let report = ctx.analyze(&input);
        let total = report.allergens_found.len()
            + report.potential_allergens.len()
            + report.warnings.len()
            + report.safe_ingredients.len();
        assert_eq!(total, input.len());
        assert!(!report.is_clear());
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let ctx = context(&[("Fragrance", Severity::Severe)]);
        let none: [&str; 0] = [];
        let report = ctx.analyze(&none);
        assert_eq!(report, AnalysisReport::default());
        assert!(report.is_clear());
    }

    #[test]
    fn no_data_means_safe() {
        let ctx = AnalysisContext::default();
        let report = ctx.analyze(&["Water (Aqua)", "CI 77891", "FD&C Red No. 40"]);
        assert_eq!(report.safe_ingredients.len(), 3);
        assert!(report.is_clear());
    }
}
