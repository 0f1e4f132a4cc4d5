/*
* Product lookup endpoint: GET /products?ip=<host>[&db=<profile>]
*/

pub mod handler;
pub mod routes;

pub use routes::product_routes;
