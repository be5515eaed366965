use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Severity, UserAllergen, UserAllergenRow};

impl UserAllergen {
    /// All allergens of a user in the order they were declared.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UserAllergen>> {
        let rows = sqlx::query_as::<_, UserAllergenRow>(
            r#"
            SELECT id, user_id, ingredient_name, severity, created_at
            FROM user_allergens
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list user allergens")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        ingredient_name: &str,
        severity: Severity,
    ) -> anyhow::Result<UserAllergen> {
        let row = sqlx::query_as::<_, UserAllergenRow>(
            r#"
            INSERT INTO user_allergens (user_id, ingredient_name, severity)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, ingredient_name, severity, created_at
            "#,
        )
        .bind(user_id)
        .bind(ingredient_name)
        .bind(severity.as_str())
        .fetch_one(db)
        .await
        .context("insert user allergen")?;
        Ok(row.into())
    }

    /// Returns false when no allergen with that id belongs to the user.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM user_allergens WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete user allergen")?;
        Ok(res.rows_affected() > 0)
    }
}
