// Product lookup handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::profiles::DatabaseProfile;
use crate::config::state::AppState;
use crate::database::{ConnectionProfile, Product};
use crate::utils::errors::LookupError;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Database host or address to query
    pub ip: Option<String>,
    /// Profile key, only consulted in multi-profile mode
    pub db: Option<String>,
}

/// Lists every product from the database at `ip`.
/// Parameters are validated before any connection is attempted.
#[instrument(name = "list_products", skip(state, query), fields(db = query.db.as_deref().unwrap_or("-")))]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, LookupError> {
    let host: &str = query
        .ip
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .ok_or_else(|| LookupError::validation("Query parameter 'ip' (database host) is required"))?;

    let profile: &DatabaseProfile = state.environment.profiles.resolve(query.db.as_deref())?;
    let connection: ConnectionProfile = ConnectionProfile::for_host(profile, host);

    let products: Vec<Product> = state.database.fetch_products(&connection).await?;
    debug!("Returning {} products from {}", products.len(), connection.key());

    Ok(Json(products))
}
