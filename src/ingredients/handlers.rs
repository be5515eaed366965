use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AllergenInfoResponse, ParseRequest, ParseResponse, ScanRequest, ScanResponse,
        SynonymsResponse,
    },
    parse::{normalize_ingredient, parse_ingredients},
    repo,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients/parse", post(parse))
        .route("/ingredients/synonyms/:name", get(synonyms))
        .route("/ingredients/info/:name", get(allergen_info))
        .route("/scan", post(scan))
}

/// Ingredient list to analyze: an explicit list wins over raw text.
fn scan_ingredients(req: ScanRequest) -> Vec<String> {
    match (req.ingredients, req.text) {
        (Some(list), _) => list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        (None, Some(text)) => parse_ingredients(&text),
        (None, None) => Vec::new(),
    }
}

#[instrument(skip(payload))]
pub async fn parse(
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<ParseRequest>,
) -> Json<ParseResponse> {
    Json(ParseResponse {
        ingredients: parse_ingredients(&payload.text),
    })
}

#[instrument(skip(state))]
pub async fn synonyms(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<SynonymsResponse>> {
    let table = repo::load_synonyms(&state.db).await?;
    Ok(Json(SynonymsResponse {
        synonyms: table.synonyms_of(&name),
        name: normalize_ingredient(&name),
    }))
}

#[instrument(skip(state))]
pub async fn allergen_info(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<AllergenInfoResponse>> {
    let known = repo::load_known_allergens(&state.db).await?;
    let info = known
        .find(&name)
        .cloned()
        .ok_or_else(|| AppError::not_found("No information available"))?;
    Ok(Json(AllergenInfoResponse {
        source: "database",
        info,
    }))
}

#[instrument(skip(state, payload))]
pub async fn scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ScanRequest>,
) -> AppResult<Json<ScanResponse>> {
    let ingredients = scan_ingredients(payload);
    if ingredients.is_empty() {
        warn!(%user_id, "scan without ingredients");
        return Err(AppError::bad_request(
            "No ingredients detected. Please try a clearer image.",
        ));
    }

    let ctx = repo::load_context(&state.db, user_id).await?;
    let analysis = ctx.analyze(&ingredients);
    info!(
        %user_id,
        ingredients = ingredients.len(),
        allergens = analysis.allergens_found.len(),
        potential = analysis.potential_allergens.len(),
        warnings = analysis.warnings.len(),
        clear = analysis.is_clear(),
        "scan analyzed"
    );

    Ok(Json(ScanResponse {
        ingredients,
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_list_wins_over_text() {
        let req = ScanRequest {
            text: Some("Lanolin, Water".into()),
            ingredients: Some(vec![" Fragrance ".into(), "".into(), "Water".into()]),
        };
        assert_eq!(scan_ingredients(req), vec!["Fragrance", "Water"]);
    }

    #[test]
    fn text_is_parsed_when_no_list() {
        let req = ScanRequest {
            text: Some("1. Water, 2. Glycerin; 3. Vitamin E".into()),
            ingredients: None,
        };
        assert_eq!(scan_ingredients(req), vec!["Water", "Glycerin", "Vitamin E"]);
        assert!(scan_ingredients(ScanRequest::default()).is_empty());
    }

    #[test]
    fn scan_request_accepts_either_field() {
        let req: ScanRequest = serde_json::from_str(r#"{"text":"Water, Glycerin"}"#).unwrap();
        assert!(req.ingredients.is_none());
        let req: ScanRequest = serde_json::from_str(r#"{"ingredients":["Water"]}"#).unwrap();
        assert_eq!(req.ingredients.as_deref(), Some(&["Water".to_string()][..]));
    }
}
