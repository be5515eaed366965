//! Ingredient parsing, synonym expansion and allergen cross-referencing.
//!
//! Everything except `repo` and `handlers` is pure and works on rows
//! already in memory.

use crate::state::AppState;
use axum::Router;

pub mod analysis;
pub mod cross_ref;
mod dto;
pub mod handlers;
pub mod known;
pub mod parse;
pub mod repo;
pub mod synonyms;

pub fn router() -> Router<AppState> {
    handlers::ingredient_routes()
}
