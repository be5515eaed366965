use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{AllergicProduct, AllergicProductRow, SafeProduct};
use crate::allergens::Severity;

/// Row-locks a user's allergic products until the transaction ends.
const LOCK_ALLERGIC_SQL: &str = r#"
    SELECT id, user_id, product_name, ingredients, reaction_severity, scanned_at
    FROM allergic_products
    WHERE user_id = $1
    ORDER BY scanned_at DESC
    FOR UPDATE
"#;

impl SafeProduct {
    /// Newest first; `limit` of `None` returns everything.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<SafeProduct>> {
        let rows = sqlx::query_as::<_, SafeProduct>(
            r#"
            SELECT id, user_id, product_name, ingredients, scanned_at
            FROM safe_products
            WHERE user_id = $1
            ORDER BY scanned_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list safe products")?;
        Ok(rows)
    }

    /// Raw ingredient texts in insertion order.
    pub async fn ingredient_texts(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT ingredients FROM safe_products WHERE user_id = $1 ORDER BY scanned_at ASC, id ASC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("load safe product ingredients")?;
        Ok(rows.into_iter().map(|(text,)| text).collect())
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        product_name: &str,
        ingredients: &str,
    ) -> anyhow::Result<SafeProduct> {
        let row = sqlx::query_as::<_, SafeProduct>(
            r#"
            INSERT INTO safe_products (user_id, product_name, ingredients)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, product_name, ingredients, scanned_at
            "#,
        )
        .bind(user_id)
        .bind(product_name)
        .bind(ingredients)
        .fetch_one(db)
        .await
        .context("insert safe product")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM safe_products WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete safe product")?;
        Ok(res.rows_affected() > 0)
    }
}

impl AllergicProduct {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<AllergicProduct>> {
        let rows = sqlx::query_as::<_, AllergicProductRow>(
            r#"
            SELECT id, user_id, product_name, ingredients, reaction_severity, scanned_at
            FROM allergic_products
            WHERE user_id = $1
            ORDER BY scanned_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list allergic products")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn ingredient_texts(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT ingredients FROM allergic_products WHERE user_id = $1 ORDER BY scanned_at ASC, id ASC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("load allergic product ingredients")?;
        Ok(rows.into_iter().map(|(text,)| text).collect())
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        product_name: &str,
        ingredients: &str,
        reaction_severity: Severity,
    ) -> anyhow::Result<AllergicProduct> {
        let row = sqlx::query_as::<_, AllergicProductRow>(
            r#"
            INSERT INTO allergic_products (user_id, product_name, ingredients, reaction_severity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, product_name, ingredients, reaction_severity, scanned_at
            "#,
        )
        .bind(user_id)
        .bind(product_name)
        .bind(ingredients)
        .bind(reaction_severity.as_str())
        .fetch_one(db)
        .await
        .context("insert allergic product")?;
        Ok(row.into())
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM allergic_products WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete allergic product")?;
        Ok(res.rows_affected() > 0)
    }

    /// Same rows as `list_by_user`, read and locked inside `tx` so a
    /// concurrent edit waits for the rewrite to commit.
    pub async fn lock_by_user_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<AllergicProduct>> {
        let rows = sqlx::query_as::<_, AllergicProductRow>(LOCK_ALLERGIC_SQL)
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await
            .context("lock allergic products")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Rewrite the ingredient text of one product within a transaction.
    pub async fn update_ingredients_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        id: Uuid,
        ingredients: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE allergic_products SET ingredients = $3 WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(ingredients)
        .execute(&mut **tx)
        .await
        .context("update allergic product ingredients")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_read_locks_only_the_users_rows() {
        let sql = LOCK_ALLERGIC_SQL.to_uppercase();
        assert!(sql.contains("WHERE USER_ID = $1"));
        assert!(sql.trim_end().ends_with("FOR UPDATE"));
    }
}
