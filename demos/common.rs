//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Recognizes `--debug`, `--host <name>` and `--port <number>`.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            host: value_of("--host").unwrap_or_else(|| "localhost".to_string()),
            port: value_of("--port")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8182),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "gremlin_client=debug"
    } else {
        "gremlin_client=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Directory holding the demo scripts.
pub fn scripts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/scripts")
}
