use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{EpiPen, EpiPenStatus};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateEpiPenRequest {
    pub name: String,
    #[serde(with = "super::iso_date")]
    pub expiration_date: Date,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEpiPenRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "super::iso_date::option")]
    pub expiration_date: Option<Date>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated column values for insert/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpiPenFields {
    pub name: String,
    pub location: Option<String>,
    pub expiration_date: Date,
    pub lot_number: Option<String>,
    pub notes: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TryFrom<CreateEpiPenRequest> for EpiPenFields {
    type Error = AppError;

    fn try_from(req: CreateEpiPenRequest) -> Result<Self, Self::Error> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("name is required"));
        }
        Ok(Self {
            name,
            location: non_blank(req.location),
            expiration_date: req.expiration_date,
            lot_number: non_blank(req.lot_number),
            notes: non_blank(req.notes),
        })
    }
}

impl EpiPenFields {
    pub fn from_existing(pen: &EpiPen) -> Self {
        Self {
            name: pen.name.clone(),
            location: pen.location.clone(),
            expiration_date: pen.expiration_date,
            lot_number: pen.lot_number.clone(),
            notes: pen.notes.clone(),
        }
    }

    pub fn apply(mut self, req: UpdateEpiPenRequest) -> Result<Self, AppError> {
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::bad_request("name cannot be blank"));
            }
            self.name = name;
        }
        if let Some(date) = req.expiration_date {
            self.expiration_date = date;
        }
        if req.location.is_some() {
            self.location = non_blank(req.location);
        }
        if req.lot_number.is_some() {
            self.lot_number = non_blank(req.lot_number);
        }
        if req.notes.is_some() {
            self.notes = non_blank(req.notes);
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct EpiPenView {
    #[serde(flatten)]
    pub pen: EpiPen,
    pub days_until_expiration: i64,
    pub status: EpiPenStatus,
}

impl EpiPenView {
    pub fn new(pen: EpiPen, today: Date, window_days: i64) -> Self {
        Self {
            days_until_expiration: pen.days_until_expiration(today),
            status: pen.status(today, window_days),
            pen,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemindersQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EpiPenReminders {
    pub window_days: i64,
    pub expired: Vec<EpiPenView>,
    pub expiring_soon: Vec<EpiPenView>,
}

impl EpiPenReminders {
    pub fn build(pens: Vec<EpiPen>, today: Date, window_days: i64) -> Self {
        let mut expired = Vec::new();
        let mut expiring_soon = Vec::new();
        for pen in pens {
            let view = EpiPenView::new(pen, today, window_days);
            match view.status {
                EpiPenStatus::Expired => expired.push(view),
                EpiPenStatus::ExpiringSoon => expiring_soon.push(view),
                EpiPenStatus::Ok => {}
            }
        }
        Self {
            window_days,
            expired,
            expiring_soon,
        }
    }

    pub fn alerts(&self) -> usize {
        self.expired.len() + self.expiring_soon.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    fn pen(name: &str, expires: Date) -> EpiPen {
        EpiPen {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            location: None,
            expiration_date: expires,
            lot_number: None,
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn create_request_parses_iso_date() {
        let req: CreateEpiPenRequest = serde_json::from_str(
            r#"{"name":" EpiPen Jr ","expiration_date":"2025-03-09","location":"  "}"#,
        )
        .unwrap();
        let fields = EpiPenFields::try_from(req).unwrap();
        assert_eq!(fields.name, "EpiPen Jr");
        assert_eq!(fields.expiration_date, date!(2025 - 03 - 09));
        assert_eq!(fields.location, None);
    }

    #[test]
    fn create_request_rejects_blank_name() {
        let req: CreateEpiPenRequest =
            serde_json::from_str(r#"{"name":"  ","expiration_date":"2025-03-09"}"#).unwrap();
        assert!(EpiPenFields::try_from(req).is_err());
    }

    #[test]
    fn update_keeps_absent_fields() {
        let mut existing = pen("EpiPen", date!(2025 - 01 - 01));
        existing.notes = Some("old notes".into());
        existing.location = Some("Home".into());

        let req: UpdateEpiPenRequest =
            serde_json::from_str(r#"{"location":"Updated Location","notes":"Updated notes"}"#).unwrap();
        let fields = EpiPenFields::from_existing(&existing).apply(req).unwrap();
        assert_eq!(fields.name, "EpiPen");
        assert_eq!(fields.location.as_deref(), Some("Updated Location"));
        assert_eq!(fields.notes.as_deref(), Some("Updated notes"));
        assert_eq!(fields.expiration_date, date!(2025 - 01 - 01));

        let req: UpdateEpiPenRequest =
            serde_json::from_str(r#"{"expiration_date":"2026-02-02"}"#).unwrap();
        let fields = EpiPenFields::from_existing(&existing).apply(req).unwrap();
        assert_eq!(fields.expiration_date, date!(2026 - 02 - 02));
    }

    #[test]
    fn reminders_split_by_status() {
        let today = date!(2024 - 06 - 01);
        let pens = vec![
            pen("Expired", date!(2024 - 05 - 02)),
            pen("Soon", date!(2024 - 06 - 16)),
            pen("Current", date!(2024 - 11 - 28)),
        ];
        let r = EpiPenReminders::build(pens, today, 30);
        assert_eq!(r.expired.len(), 1);
        assert_eq!(r.expired[0].pen.name, "Expired");
        assert_eq!(r.expiring_soon.len(), 1);
        assert_eq!(r.expiring_soon[0].days_until_expiration, 15);
        assert_eq!(r.alerts(), 2);
    }
}
