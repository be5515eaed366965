use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct MedicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: String,
    pub times: Json<Vec<String>>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

/// A medication on the user's schedule.
#[derive(Debug, Clone, Serialize)]
pub struct Medication {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: String,
    /// `HH:MM`, 24h.
    pub times: Vec<String>,
    pub notes: Option<String>,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MedicationRow> for Medication {
    fn from(r: MedicationRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            dosage: r.dosage,
            frequency: r.frequency,
            times: r.times.0,
            notes: r.notes,
            active: r.active,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    pub scheduled_time: Option<String>,
    pub notes: Option<String>,
}

/// Log entry joined with the medication it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    pub scheduled_time: Option<String>,
    pub notes: Option<String>,
}
