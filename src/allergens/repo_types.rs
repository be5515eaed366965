use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// How strongly a user reacts to an ingredient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Unknown => "unknown",
        }
    }

    /// Anything unrecognised reads back as `Unknown`.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "mild" => Severity::Mild,
            "moderate" => Severity::Moderate,
            "severe" => Severity::Severe,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, FromRow)]
pub struct UserAllergenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_name: String,
    pub severity: String,
    pub created_at: OffsetDateTime,
}

/// Ingredient the user has declared an allergy to.
#[derive(Debug, Clone, Serialize)]
pub struct UserAllergen {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub ingredient_name: String,
    pub severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserAllergenRow> for UserAllergen {
    fn from(r: UserAllergenRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            ingredient_name: r.ingredient_name,
            severity: Severity::parse_lossy(&r.severity),
            created_at: r.created_at,
        }
    }
}
