// Library root for the product lookup service

pub mod api;
pub mod config;
pub mod core;
pub mod database;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::core::server::{create_app, run};
pub use crate::database::{DatabaseService, Product};
pub use crate::utils::errors::LookupError;
