//! REST API server demo
//!
//! Runs findnews with the REST API enabled. Without a config file the in-memory
//! identity provider is used, so accounts only live as long as the process.
//!
//! ```bash
//! RUST_LOG=findnews=debug cargo run --example serve -- [config.json]
//! ```
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:6790/swagger-ui
//! - Register via POST http://localhost:6790/api/session/register
//! - Read the feed view via GET http://localhost:6790/
//! - Stream toasts and state changes via GET http://localhost:6790/api/events

use findnews::{Config, NewsApp, run_with_shutdown};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("findnews=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let address = config.server.api.bind_address;

    let app = NewsApp::new(config).await?;
    let server = app.spawn_api_server();

    println!("findnews REST API");
    println!("  Swagger UI:    http://{address}/swagger-ui");
    println!("  Feed view:     http://{address}/");
    println!("  Events stream: http://{address}/api/events");
    println!();
    println!("Example commands:");
    println!("  # Create an account");
    println!("  curl -X POST http://{address}/api/session/register \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"email\": \"reader@example.com\", \"password\": \"hunter22\", \"confirm_password\": \"hunter22\"}}'"
    );
    println!();
    println!("  # Search the feed");
    println!("  curl 'http://{address}/api/feed?q=climate'");
    println!();
    println!("  # Stream events (Server-Sent Events)");
    println!("  curl -N http://{address}/api/events");

    // Blocks until SIGINT/SIGTERM
    run_with_shutdown(app).await?;
    server.await??;

    Ok(())
}
