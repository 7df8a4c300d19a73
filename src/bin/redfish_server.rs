//!
//! Redfish server binary
//! ---------------------
//! Command-line entry point for the Redfish gateway. Configuration comes from
//! environment variables; CLI flags override them.

use anyhow::{Context, Result};
use std::env;

use redfish_gateway::config::Config;

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag
            && i + 1 < args.len() {
                return args[i + 1].parse::<u16>().ok();
            }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

const USAGE: &str = "Redfish Gateway

USAGE:
  redfish_server [--http-port N] [--no-auth]

OPTIONS:
  --http-port N    HTTP port (env: REDFISH_HTTP_PORT, default 8181)
  --no-auth        Serve every endpoint without authentication (env: REDFISH_AUTH_REQUIRED=false)
  -h, --help       Print this help

ENVIRONMENT:
  REDFISH_HOST                    Bind address (default 0.0.0.0)
  AUTH_ADMIN_USERNAME             Admin user name (default admin)
  AUTH_ADMIN_PASSWORD             Admin password
  AUTH_JWT_KEY                    Token signing key (random per process when unset)
  AUTH_JWT_EXPIRATION_SECS        Token lifetime floor in seconds (default 86400)
  REDFISH_SESSION_TIMEOUT_SECS    Idle session timeout in seconds (default 1800)
  REDFISH_SESSION_CLEANUP_SECS    Expired session sweep interval in seconds (default 60)
";

#[tokio::main]
async fn main() -> Result<()> {
    println!(r"    ____           ______     __
   / __ \___  ____/ / __(_)___/ /_
  / /_/ / _ \/ __  / /_/ / ___/ __ \
 / _, _/  __/ /_/ / __/ (__  ) / / /
/_/ |_|\___/\__,_/_/ /_/____/_/ /_/ ");

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .try_init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::from_env().context("While loading configuration from environment")?;

    // CLI arguments override environment
    if let Some(port) = parse_port_arg(&args, "--http-port") {
        config.server.http_port = port;
    }
    if has_flag(&args, "--no-auth") {
        config.server.auth_required = false;
    }
    if config.server.auth_required && config.auth.admin_password.is_empty() {
        tracing::warn!("AUTH_ADMIN_PASSWORD is empty; credential logins are refused until it is set");
    }

    println!(
        "Redfish gateway starting: http={}:{}, auth_required={}",
        config.server.host, config.server.http_port, config.server.auth_required
    );
    tracing::info!(config = ?config, "configuration loaded");

    redfish_gateway::server::run_with_config(config).await
}
