use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use repo_types::{Severity, UserAllergen};

pub fn router() -> Router<AppState> {
    handlers::allergen_routes()
}
