//! portfolio-guard
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / client
//!        │
//!        ▼
//!   ┌──────────────────────────── portfolio-guard ───────────────────────────┐
//!   │  request id → trace → timeout → body limit → metrics                   │
//!   │                                                                        │
//!   │  POST /api/contact                                                     │
//!   │     → trust check (Origin / Referer / Sec-Fetch-Site)     ──▶ 403      │
//!   │     → rate limit ("contact:<ip>", fixed window)           ──▶ 429      │
//!   │     → validate payload                                    ──▶ 400      │
//!   │     → ContactSink (store / notify)                        ──▶ 200      │
//!   │                                                                        │
//!   │  GET /auth/callback?code&next                                          │
//!   │     → sanitize `next`                                     ──▶ 303      │
//!   │                                                                        │
//!   │  config (TOML + APP_BASE_URL, hot reload)   logging   metrics          │
//!   └────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use portfolio_guard::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "portfolio-guard")]
#[command(about = "Guarded contact and sign-in endpoints for a portfolio site", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (watched for changes).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        bind_override: cli.bind,
    })
    .await
}
