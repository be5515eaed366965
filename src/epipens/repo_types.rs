use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpiPenStatus {
    Expired,
    ExpiringSoon,
    Ok,
}

/// Auto-injector the user carries or stores somewhere.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EpiPen {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    #[serde(with = "super::iso_date")]
    pub expiration_date: Date,
    pub lot_number: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl EpiPen {
    /// Negative once the pen has expired.
    pub fn days_until_expiration(&self, today: Date) -> i64 {
        (self.expiration_date - today).whole_days()
    }

    pub fn is_expired(&self, today: Date) -> bool {
        self.expiration_date < today
    }

    pub fn needs_reminder(&self, today: Date, window_days: i64) -> bool {
        self.days_until_expiration(today) <= window_days
    }

    pub fn status(&self, today: Date, window_days: i64) -> EpiPenStatus {
        if self.is_expired(today) {
            EpiPenStatus::Expired
        } else if self.needs_reminder(today, window_days) {
            EpiPenStatus::ExpiringSoon
        } else {
            EpiPenStatus::Ok
        }
    }
}
