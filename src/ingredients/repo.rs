use anyhow::Context;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{
    analysis::{AnalysisContext, PersonalAllergen},
    known::{KnownAllergen, KnownAllergenTable},
    synonyms::{IngredientSynonym, SynonymTable},
};
use crate::{
    allergens::UserAllergen,
    products::{AllergicProduct, SafeProduct},
};

pub async fn load_synonyms(db: &PgPool) -> anyhow::Result<SynonymTable> {
    let rows = sqlx::query_as::<_, IngredientSynonym>(
        r#"SELECT primary_name, synonym FROM ingredient_synonyms ORDER BY id ASC"#,
    )
    .fetch_all(db)
    .await
    .context("load ingredient synonyms")?;
    Ok(SynonymTable::new(rows))
}

pub async fn load_known_allergens(db: &PgPool) -> anyhow::Result<KnownAllergenTable> {
    let rows = sqlx::query_as::<_, KnownAllergen>(
        r#"
        SELECT name, category, description, where_found, product_categories
        FROM known_allergens
        ORDER BY id ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("load known allergens")?;
    Ok(KnownAllergenTable::new(rows))
}

fn personal_allergens(allergens: &[UserAllergen]) -> Vec<PersonalAllergen> {
    allergens
        .iter()
        .map(|a| PersonalAllergen {
            name: a.ingredient_name.clone(),
            severity: a.severity,
        })
        .collect()
}

/// Loads the reference tables and everything the user has recorded.
pub async fn load_context(db: &PgPool, user_id: Uuid) -> anyhow::Result<AnalysisContext> {
    let allergens = UserAllergen::list_by_user(db, user_id).await?;
    load_context_with(db, user_id, &allergens).await
}

/// Like `load_context`, for callers that already hold the user's allergens.
pub async fn load_context_with(
    db: &PgPool,
    user_id: Uuid,
    allergens: &[UserAllergen],
) -> anyhow::Result<AnalysisContext> {
    let personal = personal_allergens(allergens);
    let allergic_products = AllergicProduct::ingredient_texts(db, user_id).await?;
    let safe_products = SafeProduct::ingredient_texts(db, user_id).await?;
    let synonyms = load_synonyms(db).await?;
    let known = load_known_allergens(db).await?;

    debug!(
        %user_id,
        personal = personal.len(),
        allergic = allergic_products.len(),
        safe = safe_products.len(),
        synonyms = synonyms.len(),
        known = known.len(),
        "analysis context loaded"
    );

    Ok(AnalysisContext {
        personal,
        allergic_products,
        safe_products,
        synonyms,
        known,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allergens::Severity;
    use time::OffsetDateTime;

    #[test]
    fn personal_allergens_keep_declaration_order() {
        let rows: Vec<UserAllergen> = [("Fragrance", Severity::Severe), ("Lanolin", Severity::Mild)]
            .into_iter()
            .map(|(name, severity)| UserAllergen {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                ingredient_name: name.into(),
                severity,
                created_at: OffsetDateTime::now_utc(),
            })
            .collect();
        let personal = personal_allergens(&rows);
        let view: Vec<(&str, Severity)> =
            personal.iter().map(|p| (p.name.as_str(), p.severity)).collect();
        assert_eq!(view, vec![("Fragrance", Severity::Severe), ("Lanolin", Severity::Mild)]);
    }
}
