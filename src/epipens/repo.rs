use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::EpiPenFields, repo_types::EpiPen};

const COLUMNS: &str = "id, user_id, name, location, expiration_date, lot_number, notes, created_at";

impl EpiPen {
    /// Soonest expiration first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<EpiPen>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM epipens WHERE user_id = $1 ORDER BY expiration_date ASC"
        );
        let rows = sqlx::query_as::<_, EpiPen>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await
            .context("list epipens")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<EpiPen>> {
        let sql = format!("SELECT {COLUMNS} FROM epipens WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, EpiPen>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("find epipen")?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, user_id: Uuid, f: &EpiPenFields) -> anyhow::Result<EpiPen> {
        let sql = format!(
            r#"
            INSERT INTO epipens (user_id, name, location, expiration_date, lot_number, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EpiPen>(&sql)
            .bind(user_id)
            .bind(&f.name)
            .bind(&f.location)
            .bind(f.expiration_date)
            .bind(&f.lot_number)
            .bind(&f.notes)
            .fetch_one(db)
            .await
            .context("insert epipen")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        f: &EpiPenFields,
    ) -> anyhow::Result<Option<EpiPen>> {
        let sql = format!(
            r#"
            UPDATE epipens
            SET name = $3, location = $4, expiration_date = $5, lot_number = $6, notes = $7
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EpiPen>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&f.name)
            .bind(&f.location)
            .bind(f.expiration_date)
            .bind(&f.lot_number)
            .bind(&f.notes)
            .fetch_optional(db)
            .await
            .context("update epipen")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM epipens WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete epipen")?;
        Ok(res.rows_affected() > 0)
    }
}
