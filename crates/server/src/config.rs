// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// Vessel-tracking backend with live course and telemetry push.
#[derive(Debug, Parser)]
#[command(name = "pelorus", version, about)]
pub struct Config {
    /// Host address to bind to.
    #[arg(long, env = "PELORUS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "PELORUS_PORT", default_value = "8080")]
    pub port: u16,

    /// Secret key for signing session tokens.
    #[arg(long, env = "PELORUS_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Log format (json or text).
    #[arg(long, env = "PELORUS_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "PELORUS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.len() < 16 {
            anyhow::bail!("secret must be at least 16 characters");
        }
        if self.log_format != "json" && self.log_format != "text" {
            anyhow::bail!("log format must be json or text, got: {}", self.log_format);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
