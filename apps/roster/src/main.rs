//! # Roster - Enrollment Server
//!
//! The main binary for the Roster student/course enrollment service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for course, student and enrollment operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │             apps/roster (THE BINARY)          │
//! │                                               │
//! │     ┌─────────────┐      ┌─────────────┐      │
//! │     │    CLI      │      │  HTTP API   │      │
//! │     │   (clap)    │      │   (axum)    │      │
//! │     └──────┬──────┘      └──────┬──────┘      │
//! │            └─────────┬──────────┘             │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │  roster-core  │                │
//! │              │  (THE MODEL)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! roster server --host 0.0.0.0 --port 8000
//!
//! # CLI operations
//! roster status
//! roster course add "Algebra"
//! roster enroll 1 3
//! ```

use clap::Parser;
use roster::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ROSTER_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ROSTER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roster=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Roster startup banner.
fn print_banner() {
    println!(
        r#"
  Roster Enrollment Server v{}

  Courses • Students • Capacity
"#,
        env!("CARGO_PKG_VERSION")
    );
}
