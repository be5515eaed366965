use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::{LogFields, MedicationFields},
    repo_types::{HistoryEntry, Medication, MedicationLog, MedicationRow},
};

const COLUMNS: &str = "id, user_id, name, dosage, frequency, times, notes, active, created_at";

impl Medication {
    pub async fn list_active(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Medication>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM medications WHERE user_id = $1 AND active ORDER BY name ASC"
        );
        let rows = sqlx::query_as::<_, MedicationRow>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await
            .context("list medications")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Only active medications can be edited or logged.
    pub async fn find_active(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<Medication>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM medications WHERE id = $1 AND user_id = $2 AND active"
        );
        let row = sqlx::query_as::<_, MedicationRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("find medication")?;
        Ok(row.map(Into::into))
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        f: &MedicationFields,
    ) -> anyhow::Result<Medication> {
        let sql = format!(
            r#"
            INSERT INTO medications (user_id, name, dosage, frequency, times, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MedicationRow>(&sql)
            .bind(user_id)
            .bind(&f.name)
            .bind(&f.dosage)
            .bind(&f.frequency)
            .bind(Json(&f.times))
            .bind(&f.notes)
            .fetch_one(db)
            .await
            .context("insert medication")?;
        Ok(row.into())
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        f: &MedicationFields,
    ) -> anyhow::Result<Option<Medication>> {
        let sql = format!(
            r#"
            UPDATE medications
            SET name = $3, dosage = $4, frequency = $5, times = $6, notes = $7
            WHERE id = $1 AND user_id = $2 AND active
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MedicationRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&f.name)
            .bind(&f.dosage)
            .bind(&f.frequency)
            .bind(Json(&f.times))
            .bind(&f.notes)
            .fetch_optional(db)
            .await
            .context("update medication")?;
        Ok(row.map(Into::into))
    }

    /// Soft delete; history stays.
    pub async fn deactivate(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE medications SET active = FALSE WHERE id = $1 AND user_id = $2 AND active"#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("deactivate medication")?;
        Ok(res.rows_affected() > 0)
    }
}

impl MedicationLog {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        medication_id: Uuid,
        f: &LogFields,
    ) -> anyhow::Result<MedicationLog> {
        let row = sqlx::query_as::<_, MedicationLog>(
            r#"
            INSERT INTO medication_logs (medication_id, user_id, taken_at, scheduled_time, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, medication_id, user_id, taken_at, scheduled_time, notes
            "#,
        )
        .bind(medication_id)
        .bind(user_id)
        .bind(f.taken_at)
        .bind(&f.scheduled_time)
        .bind(&f.notes)
        .fetch_one(db)
        .await
        .context("insert medication log")?;
        Ok(row)
    }

    pub async fn list_since(
        db: &PgPool,
        user_id: Uuid,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<MedicationLog>> {
        let rows = sqlx::query_as::<_, MedicationLog>(
            r#"
            SELECT id, medication_id, user_id, taken_at, scheduled_time, notes
            FROM medication_logs
            WHERE user_id = $1 AND taken_at >= $2
            ORDER BY taken_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(db)
        .await
        .context("list medication logs")?;
        Ok(rows)
    }

    pub async fn history(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT l.id, l.medication_id, m.name AS medication_name, m.dosage,
                   l.taken_at, l.scheduled_time, l.notes
            FROM medication_logs l
            JOIN medications m ON m.id = l.medication_id
            WHERE l.user_id = $1
            ORDER BY l.taken_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("medication history")?;
        Ok(rows)
    }
}
