use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        IngredientProductsResponse, PotentialAllergensResponse, RemoveIngredientResponse,
        RenameIngredientRequest, RenameIngredientResponse, SaveProductRequest, SavedProduct,
    },
    repo_types::{AllergicProduct, ProductKind, SafeProduct},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    ingredients::{parse::join_ingredients, repo::load_context},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(save_product))
        .route("/products/safe", get(list_safe))
        .route("/products/safe/:id", delete(delete_safe))
        .route("/products/allergic", get(list_allergic))
        .route("/products/allergic/:id", delete(delete_allergic))
}

pub fn potential_routes() -> Router<AppState> {
    Router::new()
        .route("/potential-allergens", get(potential_allergens))
        .route("/potential-allergens/:name/products", get(ingredient_products))
        .route("/potential-allergens/:name/rename", post(rename_ingredient))
        .route("/potential-allergens/:name/remove", post(remove_ingredient))
}

#[instrument(skip(state, payload))]
pub async fn save_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveProductRequest>,
) -> AppResult<(StatusCode, Json<SavedProduct>)> {
    let ingredients: Vec<&str> = payload
        .ingredients
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if ingredients.is_empty() {
        warn!(%user_id, "save product without ingredients");
        return Err(AppError::bad_request("No scan results to save"));
    }

    let name = payload.name();
    let text = join_ingredients(&ingredients);
    let saved: SavedProduct = match payload.product_type {
        ProductKind::Allergic => {
            AllergicProduct::create(&state.db, user_id, &name, &text, payload.reaction_severity)
                .await?
                .into()
        }
        ProductKind::Safe => SafeProduct::create(&state.db, user_id, &name, &text)
            .await?
            .into(),
    };

    info!(%user_id, product_id = %saved.id, kind = ?saved.product_type, "product saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn list_safe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<SafeProduct>>> {
    Ok(Json(SafeProduct::list_by_user(&state.db, user_id, None).await?))
}

#[instrument(skip(state))]
pub async fn list_allergic(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<AllergicProduct>>> {
    Ok(Json(AllergicProduct::list_by_user(&state.db, user_id, None).await?))
}

#[instrument(skip(state))]
pub async fn delete_safe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !SafeProduct::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Product not found"));
    }
    info!(%user_id, %id, "safe product removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_allergic(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !AllergicProduct::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Product not found"));
    }
    info!(%user_id, %id, "allergic product removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn potential_allergens(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PotentialAllergensResponse>> {
    let ctx = load_context(&state.db, user_id).await?;
    Ok(Json(PotentialAllergensResponse {
        potential_allergens: ctx.potential_allergens(),
    }))
}

#[instrument(skip(state))]
pub async fn ingredient_products(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<IngredientProductsResponse>> {
    let products = AllergicProduct::list_by_user(&state.db, user_id, None).await?;
    let matching = services::products_containing(&products, &name)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(IngredientProductsResponse {
        ingredient_name: name,
        products: matching,
    }))
}

#[instrument(skip(state, payload))]
pub async fn rename_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
    Json(payload): Json<RenameIngredientRequest>,
) -> AppResult<Json<RenameIngredientResponse>> {
    let new_name = payload.new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(AppError::bad_request("New ingredient name is required"));
    }

    let updated = services::rename_ingredient(&state.db, user_id, &name, &new_name).await?;
    if updated == 0 {
        return Err(AppError::not_found("No instances found to update"));
    }

    info!(%user_id, from = %name, to = %new_name, updated, "ingredient renamed");
    Ok(Json(RenameIngredientResponse {
        ingredient_name: name,
        new_name,
        updated,
    }))
}

#[instrument(skip(state))]
pub async fn remove_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<RemoveIngredientResponse>> {
    let removed_from = services::remove_ingredient(&state.db, user_id, &name).await?;
    if removed_from == 0 {
        return Err(AppError::not_found("No instances found to remove"));
    }

    info!(%user_id, ingredient = %name, removed_from, "ingredient removed");
    Ok(Json(RemoveIngredientResponse {
        ingredient_name: name,
        removed_from,
    }))
}
