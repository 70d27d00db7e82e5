//! Script file demonstration.
//!
//! Demonstrates:
//! - Resolving scripts against `groovy_script_path`
//! - Passing bindings to a file-based script
//! - Handling a missing script file
//!
//! Usage:
//!   cargo run --example 002_script_file
//!   cargo run --example 002_script_file -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use gremlin_client::{Bindings, Connection, Error, Result};
use serde_json::json;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 002: Script File ===\n");

    let mut conn = Connection::builder()
        .host(&args.host)
        .port(args.port)
        .groovy_script_path(common::scripts_dir())
        .connect()?;

    println!("[1] vertex_count.groovy with label=person");
    let mut bindings = Bindings::default();
    bindings.insert("label".to_string(), json!("person"));

    let count = conn.send_file("vertex_count.groovy", &bindings).await?;
    println!("    Result: {count}");
    println!("    ✓ Passed\n");

    println!("[2] Missing script");
    match conn.send_file("missing.groovy", &bindings).await {
        Err(Error::Io(e)) => println!("    ✓ IO error as expected: {e}\n"),
        other => println!("    ✗ Unexpected: {other:?}\n"),
    }

    conn.close();
    println!("=== Done ===");
    Ok(())
}
