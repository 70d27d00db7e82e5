//! Bindings and error handling demonstration.
//!
//! Demonstrates:
//! - Substituting variables through bindings
//! - Distinguishing server errors from timeouts
//! - Loading options from JSON
//!
//! Usage:
//!   cargo run --example 003_bindings
//!   cargo run --example 003_bindings -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use gremlin_client::{Bindings, Connection, ConnectionOptions, Error, Result};
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
    println!("=== 003: Bindings ===\n");

    let options: ConnectionOptions = serde_json::from_value(json!({
        "host": args.host,
        "port": args.port,
        "connectionTimeout": 5,
        "responseTimeout": 2.5
    }))?;
    println!("[Setup] Options: {options:?}\n");

    let mut conn = Connection::connect(options)?;

    println!("[1] Names of people older than min_age");
    let mut bindings = Bindings::default();
    bindings.insert("min_age".to_string(), json!(30));

    let names = conn
        .send_query(
            "g.V().hasLabel('person').has('age', gt(min_age)).values('name')",
            &bindings,
        )
        .await?;
    println!("    Result: {names}");
    println!("    ✓ Passed\n");

    println!("[2] Broken script");
    match conn.send_query("g.V(", &Bindings::default()).await {
        Err(Error::Server { code, message, .. }) => {
            println!("    ✓ Server error {code:?}: {message}\n");
        }
        Err(e) if e.is_timeout() => println!("    ✗ Timed out: {e}\n"),
        other => println!("    ✗ Unexpected: {other:?}\n"),
    }

    conn.close();
    println!("=== Done ===");
    Ok(())
}
