use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Medication, MedicationLog};
use crate::error::AppError;

lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap();
}

/// Parses `"08:00, 20:00"` into zero-padded 24h times, in input order.
pub fn parse_times(raw: &str) -> Result<Vec<String>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let caps = TIME_RE
                .captures(t)
                .ok_or_else(|| AppError::bad_request(format!("invalid time: {t}")))?;
            let hour: u8 = caps[1].parse().unwrap_or(u8::MAX);
            let minute: u8 = caps[2].parse().unwrap_or(u8::MAX);
            if hour > 23 || minute > 59 {
                return Err(AppError::bad_request(format!("invalid time: {t}")));
            }
            Ok(format!("{hour:02}:{minute:02}"))
        })
        .collect()
}

fn required(v: &str, field: &str) -> Result<String, AppError> {
    let v = v.trim();
    if v.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(v.to_string())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct CreateMedicationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: String,
    /// Comma separated, e.g. `"08:00, 20:00"`.
    #[serde(default)]
    pub times: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub times: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationFields {
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: String,
    pub times: Vec<String>,
    pub notes: Option<String>,
}

impl TryFrom<CreateMedicationRequest> for MedicationFields {
    type Error = AppError;

    fn try_from(req: CreateMedicationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required(&req.name, "name")?,
            dosage: non_blank(req.dosage),
            frequency: required(&req.frequency, "frequency")?,
            times: req.times.as_deref().map(parse_times).transpose()?.unwrap_or_default(),
            notes: non_blank(req.notes),
        })
    }
}

impl MedicationFields {
    pub fn from_existing(m: &Medication) -> Self {
        Self {
            name: m.name.clone(),
            dosage: m.dosage.clone(),
            frequency: m.frequency.clone(),
            times: m.times.clone(),
            notes: m.notes.clone(),
        }
    }

    pub fn apply(mut self, req: UpdateMedicationRequest) -> Result<Self, AppError> {
        if let Some(name) = req.name {
            self.name = required(&name, "name")?;
        }
        if let Some(frequency) = req.frequency {
            self.frequency = required(&frequency, "frequency")?;
        }
        if let Some(times) = req.times {
            self.times = parse_times(&times)?;
        }
        if req.dosage.is_some() {
            self.dosage = non_blank(req.dosage);
        }
        if req.notes.is_some() {
            self.notes = non_blank(req.notes);
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogDoseRequest {
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub taken_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFields {
    pub taken_at: OffsetDateTime,
    pub scheduled_time: Option<String>,
    pub notes: Option<String>,
}

impl LogFields {
    pub fn from_request(req: LogDoseRequest, now: OffsetDateTime) -> Result<Self, AppError> {
        let scheduled_time = match non_blank(req.scheduled_time) {
            Some(t) => parse_times(&t)?.into_iter().next(),
            None => None,
        };
        Ok(Self {
            taken_at: req.taken_at.unwrap_or(now),
            scheduled_time,
            notes: non_blank(req.notes),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    50
}

/// One dose due today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSlot {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub time: String,
    pub taken: bool,
}

/// Today's schedule across active medications, earliest first.
pub fn build_reminders(medications: &[Medication], logs_today: &[MedicationLog]) -> Vec<ReminderSlot> {
    let taken: HashSet<(Uuid, &str)> = logs_today
        .iter()
        .filter_map(|l| l.scheduled_time.as_deref().map(|t| (l.medication_id, t)))
        .collect();

    let mut slots: Vec<ReminderSlot> = medications
        .iter()
        .filter(|m| m.active)
        .flat_map(|m| {
            m.times.iter().map(|t| ReminderSlot {
                medication_id: m.id,
                name: m.name.clone(),
                dosage: m.dosage.clone(),
                time: t.clone(),
                taken: taken.contains(&(m.id, t.as_str())),
            })
        })
        .collect();
    slots.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.name.cmp(&b.name)));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn med(name: &str, times: &[&str], active: bool) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            dosage: Some("200mg".into()),
            frequency: "twice_daily".into(),
            times: times.iter().map(|t| t.to_string()).collect(),
            notes: None,
            active,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn parses_times_list() {
        assert_eq!(parse_times("08:00, 20:00").unwrap(), vec!["08:00", "20:00"]);
        assert_eq!(
            parse_times("08:00, 14:00, 20:00").unwrap(),
            vec!["08:00", "14:00", "20:00"]
        );
        assert_eq!(parse_times("8:05,").unwrap(), vec!["08:05"]);
        assert!(parse_times("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_times() {
        assert!(parse_times("8am").is_err());
        assert!(parse_times("24:00").is_err());
        assert!(parse_times("12:60").is_err());
    }

    #[test]
    fn create_requires_name_and_frequency() {
        let req: CreateMedicationRequest =
            serde_json::from_str(r#"{"frequency":"daily"}"#).unwrap();
        assert!(MedicationFields::try_from(req).is_err());

        let req: CreateMedicationRequest =
            serde_json::from_str(r#"{"name":"Ibuprofen"}"#).unwrap();
        assert!(MedicationFields::try_from(req).is_err());

        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":"Ibuprofen","dosage":"200mg","frequency":"twice_daily","times":"08:00, 20:00","notes":"For headaches"}"#,
        )
        .unwrap();
        let fields = MedicationFields::try_from(req).unwrap();
        assert_eq!(fields.times, vec!["08:00", "20:00"]);
        assert_eq!(fields.dosage.as_deref(), Some("200mg"));
    }

    #[test]
    fn update_merges_fields() {
        let existing = med("Aspirin", &["08:00"], true);
        let req = UpdateMedicationRequest {
            name: Some("Updated Name".into()),
            notes: Some("Updated notes".into()),
            ..Default::default()
        };
        let fields = MedicationFields::from_existing(&existing).apply(req).unwrap();
        assert_eq!(fields.name, "Updated Name");
        assert_eq!(fields.frequency, "twice_daily");
        assert_eq!(fields.times, vec!["08:00"]);
        assert_eq!(fields.notes.as_deref(), Some("Updated notes"));
    }

    #[test]
    fn log_defaults_to_now() {
        let now = OffsetDateTime::now_utc();
        let fields = LogFields::from_request(
            LogDoseRequest {
                scheduled_time: Some("8:00".into()),
                notes: Some("Took on time".into()),
                taken_at: None,
            },
            now,
        )
        .unwrap();
        assert_eq!(fields.taken_at, now);
        assert_eq!(fields.scheduled_time.as_deref(), Some("08:00"));
    }

    #[test]
    fn reminders_are_sorted_and_marked() {
        let a = med("Vitamin D", &["20:00", "08:00"], true);
        let b = med("Antihistamine", &["08:00"], true);
        let gone = med("Old", &["07:00"], false);
        let log = MedicationLog {
            id: Uuid::new_v4(),
            medication_id: a.id,
            user_id: Uuid::nil(),
            taken_at: OffsetDateTime::now_utc(),
            scheduled_time: Some("08:00".into()),
            notes: None,
        };
        let slots = build_reminders(&[a.clone(), b, gone], &[log]);
        let view: Vec<(&str, &str, bool)> = slots
            .iter()
            .map(|s| (s.time.as_str(), s.name.as_str(), s.taken))
            .collect();
        assert_eq!(
            view,
            vec![
                ("08:00", "Antihistamine", false),
                ("08:00", "Vitamin D", true),
                ("20:00", "Vitamin D", false),
            ]
        );
    }
}
