use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::{OffsetDateTime, Time};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        build_reminders, CreateMedicationRequest, LogDoseRequest, LogFields, MedicationFields,
        Pagination, ReminderSlot, UpdateMedicationRequest,
    },
    repo_types::{HistoryEntry, Medication, MedicationLog},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn medication_routes() -> Router<AppState> {
    Router::new()
        .route("/medications", get(list_medications).post(add_medication))
        .route("/medications/reminders", get(reminders))
        .route("/medications/history", get(history))
        .route("/medications/:id", put(update_medication).delete(delete_medication))
        .route("/medications/:id/log", post(log_dose))
}

#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Medication>>> {
    Ok(Json(Medication::list_active(&state.db, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMedicationRequest>,
) -> AppResult<(StatusCode, Json<Medication>)> {
    let fields = MedicationFields::try_from(payload)?;
    let med = Medication::create(&state.db, user_id, &fields).await?;
    info!(%user_id, medication_id = %med.id, "medication added");
    Ok((StatusCode::CREATED, Json(med)))
}

#[instrument(skip(state, payload))]
pub async fn update_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMedicationRequest>,
) -> AppResult<Json<Medication>> {
    let existing = Medication::find_active(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Medication not found"))?;
    let fields = MedicationFields::from_existing(&existing).apply(payload)?;
    let med = Medication::update(&state.db, user_id, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Medication not found"))?;
    info!(%user_id, medication_id = %med.id, "medication updated");
    Ok(Json(med))
}

#[instrument(skip(state))]
pub async fn delete_medication(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !Medication::deactivate(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Medication not found"));
    }
    info!(%user_id, %id, "medication deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn log_dose(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LogDoseRequest>,
) -> AppResult<(StatusCode, Json<MedicationLog>)> {
    if Medication::find_active(&state.db, user_id, id).await?.is_none() {
        return Err(AppError::not_found("Medication not found"));
    }
    let fields = LogFields::from_request(payload, OffsetDateTime::now_utc())?;
    let log = MedicationLog::create(&state.db, user_id, id, &fields).await?;
    info!(%user_id, medication_id = %id, log_id = %log.id, "dose logged");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ReminderSlot>>> {
    let start_of_day = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    let meds = Medication::list_active(&state.db, user_id).await?;
    let logs = MedicationLog::list_since(&state.db, user_id, start_of_day).await?;
    Ok(Json(build_reminders(&meds, &logs)))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let limit = p.limit.clamp(1, 500);
    let offset = p.offset.max(0);
    Ok(Json(MedicationLog::history(&state.db, user_id, limit, offset).await?))
}
