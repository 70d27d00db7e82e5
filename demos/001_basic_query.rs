//! Basic query demonstration.
//!
//! Demonstrates:
//! - Connecting with default options
//! - Running a script without bindings
//! - Reading the result data
//!
//! Usage:
//!   cargo run --example 001_basic_query
//!   cargo run --example 001_basic_query -- --host graph.internal --port 8182
//!   cargo run --example 001_basic_query -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use common::Args;
use gremlin_client::{Bindings, Connection, Result};

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
    println!("=== 001: Basic Query ===\n");

    println!("[Setup] Connecting to {}:{}...", args.host, args.port);
    let mut conn = Connection::builder()
        .host(&args.host)
        .port(args.port)
        .connection_timeout(Duration::from_secs(5))
        .connect()?;
    println!("        ✓ Transport started ({})\n", conn.url());

    println!("[1] Vertex count");
    let count = conn.send_query("g.V().count()", &Bindings::default()).await?;
    println!("    Result: {count}");
    println!("    ✓ Passed\n");

    println!("[2] Arithmetic");
    let sum = conn.send_query("1 + 1", &Bindings::default()).await?;
    println!("    Result: {sum}");
    println!("    ✓ Passed\n");

    conn.close();
    println!("=== Done ===");
    Ok(())
}
