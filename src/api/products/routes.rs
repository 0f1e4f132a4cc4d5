// Product lookup route definitions

use axum::{
    routing::get,
    Router,
};

use crate::config::state::AppState;
use super::handler;

/// Creates router with the product listing endpoint
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handler::list_products_handler))
}
