//! Landing summary for a signed-in user.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::{
    allergens::UserAllergen,
    auth::extractors::AuthUser,
    epipens::{dto::EpiPenReminders, EpiPen},
    error::AppResult,
    ingredients::{cross_ref::PotentialAllergen, repo::load_context_with},
    products::{AllergicProduct, SafeProduct},
    state::AppState,
};

const RECENT_PRODUCTS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub allergens: Vec<UserAllergen>,
    pub recent_safe_products: Vec<SafeProduct>,
    pub recent_allergic_products: Vec<AllergicProduct>,
    pub potential_allergens: Vec<PotentialAllergen>,
    pub epipen_alerts: EpiPenReminders,
}

/// Most suspicious first, capped at `limit`.
fn top_potential(mut all: Vec<PotentialAllergen>, limit: usize) -> Vec<PotentialAllergen> {
    all.truncate(limit);
    all
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Dashboard>> {
    let cfg = &state.config.analysis;
    let allergens = UserAllergen::list_by_user(&state.db, user_id).await?;
    let ctx = load_context_with(&state.db, user_id, &allergens).await?;
    let recent_safe_products =
        SafeProduct::list_by_user(&state.db, user_id, Some(RECENT_PRODUCTS)).await?;
    let recent_allergic_products =
        AllergicProduct::list_by_user(&state.db, user_id, Some(RECENT_PRODUCTS)).await?;
    let pens = EpiPen::list_by_user(&state.db, user_id).await?;
    let today = OffsetDateTime::now_utc().date();

    let dashboard = Dashboard {
        allergens,
        recent_safe_products,
        recent_allergic_products,
        potential_allergens: top_potential(ctx.potential_allergens(), cfg.potential_limit),
        epipen_alerts: EpiPenReminders::build(pens, today, cfg.epipen_reminder_days),
    };
    debug!(
        %user_id,
        potential = dashboard.potential_allergens.len(),
        epipen_alerts = dashboard.epipen_alerts.alerts(),
        "dashboard built"
    );
    Ok(Json(dashboard))
}
