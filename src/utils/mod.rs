// Start of file: /src/utils/mod.rs

/*
    * Error taxonomy, middleware error mapping and request logging.
*/

pub mod error_handler;
pub mod errors;
pub mod response_handler;

pub use errors::LookupError;

// End of file: /src/utils/mod.rs
