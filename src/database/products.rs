// =============================================================================
// PRODUCT LISTING - fixed join over material, price, stock and image
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::utils::errors::LookupError;

// =============================================================================
// SQL CONSTANTS
// =============================================================================

/// Material is the root; price, stock and image rows are optional attachments.
/// Price and stock used to be inner joins, which dropped materials lacking either row.
/// Numeric columns are cast so every backend column type decodes the same way.
pub const PRODUCTS_QUERY: &str = r#"
    SELECT
        M.MAT_DESC,
        M.MAT_CODI,
        M.MAT_REFE,
        CAST(P.TAB_PREC0 AS DOUBLE PRECISION) AS TAB_PREC0,
        CAST(E.EST_QUAN AS BIGINT) AS EST_QUAN,
        I.IMAGEM
    FROM
        MATERIAL AS M
    LEFT JOIN
        PRECOVENDA AS P ON P.MAT_CODI = M.MAT_CODI
    LEFT JOIN
        ESTOQUE AS E ON E.MAT_CODI = M.MAT_CODI
    LEFT JOIN
        IMAGENS AS I ON I.MAT_CODI = M.MAT_CODI
"#;

// =============================================================================
// MODELS
// =============================================================================

/// Raw row as decoded from the database. Unquoted identifiers fold to lower case.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub mat_desc: String,
    pub mat_codi: String,
    pub mat_refe: Option<String>,
    pub tab_prec0: Option<f64>,
    pub est_quan: Option<i64>,
    pub imagem: Option<String>,
}

/// One entry of the `/products` response. Field names on the wire are fixed.
/// Absent joins serialize as `null`, never as missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "MAT_DESC")]
    pub description: String,
    #[serde(rename = "MAT_CODI")]
    pub code: String,
    #[serde(rename = "MAT_REFE")]
    pub reference: Option<String>,
    #[serde(rename = "TAB_PREC0")]
    pub price: Option<f64>,
    #[serde(rename = "EST_QUAN")]
    pub quantity: Option<i64>,
    #[serde(rename = "IMAGEM")]
    pub image: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            description: row.mat_desc.trim().to_string(),
            code: row.mat_codi,
            reference: row.mat_refe.map(|reference| reference.trim().to_string()),
            price: row.tab_prec0,
            quantity: row.est_quan,
            image: row.imagem,
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Runs the listing query within `query_timeout`. Either every row comes back or none do.
pub async fn fetch_products(
    pool: &PgPool,
    target: &str,
    query_timeout: Duration,
) -> Result<Vec<Product>, LookupError> {
    let rows: Vec<ProductRow> = tokio::time::timeout(
        query_timeout,
        sqlx::query_as::<_, ProductRow>(PRODUCTS_QUERY).fetch_all(pool),
    )
    .await
    .map_err(|_| LookupError::QueryTimeout {
        target: target.to_string(),
        elapsed: query_timeout,
    })?
    .map_err(|source| LookupError::from_driver(target, source))?;

    debug!("Product query against {} returned {} rows", target, rows.len());
    Ok(shape_rows(rows))
}

/// Converts raw rows into products, keeping the first row seen for each material code
pub fn shape_rows(rows: Vec<ProductRow>) -> Vec<Product> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut products: Vec<Product> = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.mat_codi.clone()) {
            warn!("Dropping duplicate row for material code '{}'", row.mat_codi);
            continue;
        }
        products.push(Product::from(row));
    }

    products
}
