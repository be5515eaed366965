use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{AllergicProduct, ProductKind, SafeProduct};
use crate::{allergens::Severity, ingredients::cross_ref::PotentialAllergen};

/// Saves the ingredients of a finished scan as a safe or allergic product.
#[derive(Debug, Deserialize)]
pub struct SaveProductRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_type: ProductKind,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub reaction_severity: Severity,
}

impl SaveProductRequest {
    pub fn name(&self) -> String {
        self.product_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown Product")
            .to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct SavedProduct {
    pub id: Uuid,
    pub product_type: ProductKind,
    pub product_name: String,
    pub ingredients: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_severity: Option<Severity>,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

impl From<SafeProduct> for SavedProduct {
    fn from(p: SafeProduct) -> Self {
        Self {
            id: p.id,
            product_type: ProductKind::Safe,
            product_name: p.product_name,
            ingredients: p.ingredients,
            reaction_severity: None,
            scanned_at: p.scanned_at,
        }
    }
}

impl From<AllergicProduct> for SavedProduct {
    fn from(p: AllergicProduct) -> Self {
        Self {
            id: p.id,
            product_type: ProductKind::Allergic,
            product_name: p.product_name,
            ingredients: p.ingredients,
            reaction_severity: Some(p.reaction_severity),
            scanned_at: p.scanned_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PotentialAllergensResponse {
    pub potential_allergens: Vec<PotentialAllergen>,
}

#[derive(Debug, Serialize)]
pub struct IngredientProductsResponse {
    pub ingredient_name: String,
    pub products: Vec<AllergicProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RenameIngredientRequest {
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct RenameIngredientResponse {
    pub ingredient_name: String,
    pub new_name: String,
    pub updated: usize,
}

#[derive(Debug, Serialize)]
pub struct RemoveIngredientResponse {
    pub ingredient_name: String,
    pub removed_from: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_defaults() {
        let req: SaveProductRequest =
            serde_json::from_str(r#"{"ingredients":["Water","Fragrance"]}"#).unwrap();
        assert_eq!(req.product_type, ProductKind::Safe);
        assert_eq!(req.reaction_severity, Severity::Unknown);
        assert_eq!(req.name(), "Unknown Product");

        let req: SaveProductRequest = serde_json::from_str(
            r#"{"product_name":" Night Cream ","product_type":"allergic","ingredients":[],"reaction_severity":"severe"}"#,
        )
        .unwrap();
        assert_eq!(req.product_type, ProductKind::Allergic);
        assert_eq!(req.reaction_severity, Severity::Severe);
        assert_eq!(req.name(), "Night Cream");
    }
}
