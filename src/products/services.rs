use anyhow::Context;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::AllergicProduct;
use crate::ingredients::parse::{join_ingredients, normalize_ingredient, parse_ingredients};

/// Products whose raw ingredient text mentions `ingredient`, ignoring case.
pub fn products_containing<'a>(
    products: &'a [AllergicProduct],
    ingredient: &str,
) -> Vec<&'a AllergicProduct> {
    let needle = ingredient.to_lowercase();
    products
        .iter()
        .filter(|p| p.ingredients.to_lowercase().contains(&needle))
        .collect()
}

/// Replaces every ingredient equal to `from` (ignoring case and padding)
/// with `to`. Returns the rewritten text and the number of replacements,
/// or `None` when nothing matched.
pub fn rename_in_text(text: &str, from: &str, to: &str) -> Option<(String, usize)> {
    let target = normalize_ingredient(from);
    let mut replaced = 0;
    let rewritten: Vec<String> = parse_ingredients(text)
        .into_iter()
        .map(|ing| {
            if normalize_ingredient(&ing) == target {
                replaced += 1;
                to.trim().to_string()
            } else {
                ing
            }
        })
        .collect();
    (replaced > 0).then(|| (join_ingredients(&rewritten), replaced))
}

/// Drops every ingredient equal to `name`. `None` when nothing matched.
pub fn remove_from_text(text: &str, name: &str) -> Option<String> {
    let target = normalize_ingredient(name);
    let parsed = parse_ingredients(text);
    let before = parsed.len();
    let kept: Vec<String> = parsed
        .into_iter()
        .filter(|ing| normalize_ingredient(ing) != target)
        .collect();
    (kept.len() < before).then(|| join_ingredients(&kept))
}

/// Ingredient texts to write back after renaming `from` to `to`, and the
/// number of ingredient instances replaced.
pub fn plan_rename(
    products: &[AllergicProduct],
    from: &str,
    to: &str,
) -> (Vec<(Uuid, String)>, usize) {
    let mut total = 0;
    let updates = products
        .iter()
        .filter_map(|p| {
            let (text, replaced) = rename_in_text(&p.ingredients, from, to)?;
            total += replaced;
            Some((p.id, text))
        })
        .collect();
    (updates, total)
}

/// Ingredient texts to write back after dropping `name`, one per changed
/// product.
pub fn plan_remove(products: &[AllergicProduct], name: &str) -> Vec<(Uuid, String)> {
    products
        .iter()
        .filter_map(|p| remove_from_text(&p.ingredients, name).map(|text| (p.id, text)))
        .collect()
}

/// Corrects a misread ingredient name across all allergic products of a
/// user. Returns how many ingredient instances were rewritten.
pub async fn rename_ingredient(
    db: &PgPool,
    user_id: Uuid,
    from: &str,
    to: &str,
) -> anyhow::Result<usize> {
    let mut tx = db.begin().await.context("begin tx")?;
    let products = AllergicProduct::lock_by_user_tx(&mut tx, user_id).await?;

    let (updates, total) = plan_rename(&products, from, to);
    for (id, text) in &updates {
        AllergicProduct::update_ingredients_tx(&mut tx, user_id, *id, text).await?;
    }
    tx.commit().await.context("commit tx")?;

    debug!(%user_id, from, to, total, products = updates.len(), "ingredient renamed");
    Ok(total)
}

/// Removes an ingredient from all allergic products of a user. Returns how
/// many products changed.
pub async fn remove_ingredient(db: &PgPool, user_id: Uuid, name: &str) -> anyhow::Result<usize> {
    let mut tx = db.begin().await.context("begin tx")?;
    let products = AllergicProduct::lock_by_user_tx(&mut tx, user_id).await?;

    let updates = plan_remove(&products, name);
    for (id, text) in &updates {
        AllergicProduct::update_ingredients_tx(&mut tx, user_id, *id, text).await?;
    }
    tx.commit().await.context("commit tx")?;

    debug!(%user_id, name, changed = updates.len(), "ingredient removed");
    Ok(updates.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allergens::Severity;
    use time::OffsetDateTime;

    fn product(name: &str, ingredients: &str) -> AllergicProduct {
        AllergicProduct {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            product_name: name.into(),
            ingredients: ingredients.into(),
            reaction_severity: Severity::Unknown,
            scanned_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn containing_is_a_case_insensitive_substring_match() {
        let products = vec![
            product("Shampoo", "Water, Fragrance Mix, Glycerin"),
            product("Cream", "Water, Lanolin"),
            product("Soap", "fragrance, Glycerin"),
        ];
        let hits: Vec<&str> = products_containing(&products, "FRAGRANCE")
            .into_iter()
            .map(|p| p.product_name.as_str())
            .collect();
        assert_eq!(hits, vec!["Shampoo", "Soap"]);
    }

    #[test]
    fn rename_only_touches_exact_ingredients() {
        let (text, n) = rename_in_text("Water, Fragrence, Fragrence Oil, fragrence", "Fragrence", "Fragrance")
            .expect("match");
        assert_eq!(n, 2);
        assert_eq!(text, "Water, Fragrance, Fragrence Oil, Fragrance");
        assert!(rename_in_text("Water, Glycerin", "Fragrence", "Fragrance").is_none());
    }

    #[test]
    fn remove_reports_change_only_when_present() {
        assert_eq!(
            remove_from_text("Water, Lanolin, Glycerin", "lanolin").as_deref(),
            Some("Water, Glycerin")
        );
        assert!(remove_from_text("Water, Glycerin", "Lanolin").is_none());
    }

    #[test]
    fn plans_touch_only_matching_products() {
        let products = vec![
            product("Shampoo", "Water, Fragrence, fragrence"),
            product("Cream", "Water, Lanolin"),
            product("Soap", "Fragrence, Lanolin"),
        ];

        let (updates, total) = plan_rename(&products, "Fragrence", "Fragrance");
        assert_eq!(total, 3);
        assert_eq!(
            updates,
            vec![
                (products[0].id, "Water, Fragrance, Fragrance".to_string()),
                (products[2].id, "Fragrance, Lanolin".to_string()),
            ]
        );

        let removed = plan_remove(&products, "lanolin");
        let ids: Vec<Uuid> = removed.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![products[1].id, products[2].id]);
        assert!(plan_remove(&products, "Glycerin").is_empty());
    }
}
