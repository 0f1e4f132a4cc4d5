// Start of file: /src/config/mod.rs

/*
* Re-export submodules related to configuration, database profiles, and app state.
*/

pub mod environment;
pub mod profiles;
pub mod state;

// End of file: /src/config/mod.rs
