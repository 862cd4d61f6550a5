//! Agent release - build-and-release orchestrator for the remote agent.
//!
//! This binary publishes per-platform agent executables and builds, tags and
//! pushes the container image, stopping at the first failure.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match agent_release::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
