use lazy_static::lazy_static;
use regex::Regex;

/// Canonical form used for every ingredient comparison.
pub fn normalize_ingredient(ingredient: &str) -> String {
    ingredient.trim().to_lowercase()
}

/// Splits a free-text ingredient list (OCR output, a comma-joined list)
/// into cleaned ingredient names, preserving order.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    lazy_static! {
        static ref SEPARATOR_RE: Regex = Regex::new(r"[,;]").unwrap();
        static ref ENUM_PREFIX_RE: Regex = Regex::new(r"^[\d.\-*•]+\s*").unwrap();
    }

    let text = text.replace(['\n', '\r'], " ");

    SEPARATOR_RE
        .split(&text)
        .map(|raw| ENUM_PREFIX_RE.replace(raw.trim(), "").into_owned())
        // tokens of two characters or fewer are OCR noise
        .filter(|ing| ing.chars().count() > 2)
        .collect()
}

/// Storage form of an ingredient list.
pub fn join_ingredients<S: AsRef<str>>(ingredients: &[S]) -> String {
    ingredients
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
