use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
mod password;
pub mod services;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
