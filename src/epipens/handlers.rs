use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        CreateEpiPenRequest, EpiPenFields, EpiPenReminders, EpiPenView, RemindersQuery,
        UpdateEpiPenRequest,
    },
    repo_types::EpiPen,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn epipen_routes() -> Router<AppState> {
    Router::new()
        .route("/epipens", get(list_epipens).post(add_epipen))
        .route("/epipens/reminders", get(epipen_reminders))
        .route("/epipens/:id", axum::routing::put(update_epipen).delete(delete_epipen))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state))]
pub async fn list_epipens(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<EpiPenView>>> {
    let window = state.config.analysis.epipen_reminder_days;
    let today = today();
    let pens = EpiPen::list_by_user(&state.db, user_id).await?;
    Ok(Json(
        pens.into_iter()
            .map(|p| EpiPenView::new(p, today, window))
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn add_epipen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEpiPenRequest>,
) -> AppResult<(StatusCode, Json<EpiPenView>)> {
    let fields = EpiPenFields::try_from(payload)?;
    let pen = EpiPen::create(&state.db, user_id, &fields).await?;
    info!(%user_id, epipen_id = %pen.id, "epipen added");
    let window = state.config.analysis.epipen_reminder_days;
    Ok((StatusCode::CREATED, Json(EpiPenView::new(pen, today(), window))))
}

#[instrument(skip(state, payload))]
pub async fn update_epipen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEpiPenRequest>,
) -> AppResult<Json<EpiPenView>> {
    let existing = EpiPen::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("EpiPen not found"))?;
    let fields = EpiPenFields::from_existing(&existing).apply(payload)?;
    let pen = EpiPen::update(&state.db, user_id, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("EpiPen not found"))?;
    info!(%user_id, epipen_id = %pen.id, "epipen updated");
    let window = state.config.analysis.epipen_reminder_days;
    Ok(Json(EpiPenView::new(pen, today(), window)))
}

#[instrument(skip(state))]
pub async fn delete_epipen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !EpiPen::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("EpiPen not found"));
    }
    info!(%user_id, %id, "epipen removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn epipen_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RemindersQuery>,
) -> AppResult<Json<EpiPenReminders>> {
    let window = q
        .days
        .filter(|d| *d >= 0)
        .unwrap_or(state.config.analysis.epipen_reminder_days);
    let pens = EpiPen::list_by_user(&state.db, user_id).await?;
    Ok(Json(EpiPenReminders::build(pens, today(), window)))
}
