use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    create_url_handler, delete_page_handler, delete_url_handler, health_handler, index_handler,
    redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler))
            .route("/new", post(create_url_handler))
            .route("/del", get(delete_page_handler).post(delete_url_handler))
            .route("/{code}", get(redirect_handler))
            .with_state(state)
    }
}
