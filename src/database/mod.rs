pub mod connection;
pub mod database_service;
pub mod lru;
pub mod products;

pub use connection::{ConnectionKey, ConnectionProfile};
pub use database_service::DatabaseService;
pub use products::Product;
