// Request-level error taxonomy for the product lookup

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::utils::error_handler::format_chain;

/// Body returned for every connection/query failure. Driver detail stays in the logs.
pub const DATABASE_FAILURE_MESSAGE: &str = "Failed to fetch products from the database";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Missing or unknown query parameter (400)
    #[error("{0}")]
    Validation(String),

    /// Unreachable host, auth failure, TLS or network failure (500)
    #[error("failed to connect to {target}")]
    Connection {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// Query execution or row decoding failed (500)
    #[error("product query against {target} failed")]
    Query {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("product query against {target} timed out after {elapsed:?}")]
    QueryTimeout { target: String, elapsed: Duration },

    /// Every connection of a healthy cached pool stayed busy past the acquire timeout (500)
    #[error("all connections to {target} are busy")]
    PoolSaturated { target: String },
}

impl LookupError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Sorts a driver error into the connection or query bucket.
    /// Anything the server reported about the statement itself counts as a query error.
    pub fn from_driver(target: impl Into<String>, source: sqlx::Error) -> Self {
        let target: String = target.into();
        match source {
            sqlx::Error::Database(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => Self::Query { target, source },
            other => Self::Connection { target, source: other },
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Connection { .. }
            | Self::Query { .. }
            | Self::QueryTimeout { .. }
            | Self::PoolSaturated { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status: StatusCode = self.status_code();

        match self {
            Self::Validation(message) => {
                warn!("Rejected product lookup: {}", message);
                (status, message).into_response()
            }
            failure => {
                error!("Failed to fetch products: {}", format_chain(&failure));
                (status, DATABASE_FAILURE_MESSAGE).into_response()
            }
        }
    }
}
