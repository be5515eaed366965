use serde::Deserialize;

use super::repo_types::Severity;

#[derive(Debug, Deserialize)]
pub struct CreateAllergenRequest {
    pub ingredient_name: String,
    #[serde(default)]
    pub severity: Severity,
}
