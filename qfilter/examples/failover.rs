//! Endpoint failover example for qfilter.
//!
//! Rotates through configured endpoints until one "answers", stopping after a
//! full round instead of looping forever.

use qfilter::prelude::*;

fn send(endpoint: &str, body: &str) -> std::result::Result<OperationStatus, String> {
    // Stand-in for an HTTP call: only node-c is up.
    if endpoint.contains("node-c") {
        println!("   → {} accepted {} bytes", endpoint, body.len());
        Ok(OperationStatus::from_response_body(r#"{"status":"ok","time":0.002}"#))
    } else {
        Err(format!("{}: connection refused", endpoint))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🌟 qfilter Failover Example\n");

    let settings = ClientSettings::from_json(
        r#"{
            "endpoints": ["http://node-a:6333", "http://node-b:6333", "http://node-c:6333"],
            "timeout_secs": 5
        }"#,
    )?;
    println!("⚙️  {} endpoints, timeout {:?}\n", settings.endpoints.len(), settings.timeout());

    let filter = Filter::from_condition(field("tenant").eq("acme"));
    let body = filter.render(false);
    let mut endpoints = settings.endpoint_rotation()?;

    for attempt in 1..=2 {
        println!("🔁 Request {}", attempt);
        match endpoints.try_each(|endpoint| send(endpoint, &body)) {
            Ok(status) => println!("✅ success: {:?}\n", status),
            Err(errors) => {
                for e in errors {
                    println!("❌ {}", e);
                }
            }
        }
    }

    // Every endpoint down: the round ends after each was tried once
    let mut dead = CircularSequence::new(["http://x:6333", "http://y:6333"])?;
    let result: std::result::Result<(), Vec<String>> =
        dead.try_each(|endpoint| Err(format!("{}: timed out", endpoint)));
    if let Err(errors) = result {
        println!("💀 all {} endpoints failed: {:?}", errors.len(), errors);
        let status = OperationStatus::from_error(&errors.join("; "));
        println!("   status: {:?}", status);
    }

    Ok(())
}
