// Start of file: src/main.rs

use product_lookup_service::core::logging::init_tracing;
use product_lookup_service::{run, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // set up logging
    init_tracing();

    // configuration is validated here; a bad environment stops the boot
    let state: AppState = AppState::from_env()?;

    run(state).await
}

// End of file: src/main.rs
