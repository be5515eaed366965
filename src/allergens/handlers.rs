use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::CreateAllergenRequest, repo_types::UserAllergen};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn allergen_routes() -> Router<AppState> {
    Router::new()
        .route("/allergens", get(list_allergens).post(add_allergen))
        .route("/allergens/:id", delete(delete_allergen))
}

#[instrument(skip(state))]
pub async fn list_allergens(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<UserAllergen>>> {
    let allergens = UserAllergen::list_by_user(&state.db, user_id).await?;
    Ok(Json(allergens))
}

#[instrument(skip(state, payload))]
pub async fn add_allergen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateAllergenRequest>,
) -> AppResult<(StatusCode, Json<UserAllergen>)> {
    let name = payload.ingredient_name.trim();
    if name.is_empty() {
        warn!(%user_id, "empty allergen name");
        return Err(AppError::bad_request("ingredient_name is required"));
    }

    let allergen = UserAllergen::create(&state.db, user_id, name, payload.severity).await?;
    info!(%user_id, allergen_id = %allergen.id, severity = %allergen.severity, "allergen added");
    Ok((StatusCode::CREATED, Json(allergen)))
}

#[instrument(skip(state))]
pub async fn delete_allergen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !UserAllergen::delete(&state.db, user_id, id).await? {
        warn!(%user_id, %id, "allergen not found or not owned");
        return Err(AppError::not_found("Allergen not found"));
    }
    info!(%user_id, %id, "allergen removed");
    Ok(StatusCode::NO_CONTENT)
}
