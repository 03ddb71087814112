//! # Overlay Node Runtime
//!
//! Entry point that establishes the node's identity.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`OVERLAY_CONFIG` file, then `OVERLAY_*` env)
//! 2. Initialize logging
//! 3. Provision the node identity
//! 4. Report the node ID and address

use std::process::ExitCode;

use tracing::error;

use node_runtime::{init_tracing, load_config, NodeRuntime};

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("node-runtime: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("node-runtime: {:#}", e);
        return ExitCode::FAILURE;
    }

    match NodeRuntime::bootstrap(config) {
        Ok(runtime) => {
            runtime.report();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Identity provisioning failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
