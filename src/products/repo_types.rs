use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::allergens::Severity;

/// Which side of the cross-reference a saved product lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Safe,
    Allergic,
}

/// Product the user tolerates.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SafeProduct {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub product_name: String,
    pub ingredients: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct AllergicProductRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub ingredients: String,
    pub reaction_severity: String,
    pub scanned_at: OffsetDateTime,
}

/// Product the user reacted to.
#[derive(Debug, Clone, Serialize)]
pub struct AllergicProduct {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub product_name: String,
    pub ingredients: String,
    pub reaction_severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

impl From<AllergicProductRow> for AllergicProduct {
    fn from(r: AllergicProductRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            product_name: r.product_name,
            ingredients: r.ingredients,
            reaction_severity: Severity::parse_lossy(&r.reaction_severity),
            scanned_at: r.scanned_at,
        }
    }
}
