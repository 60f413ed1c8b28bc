// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::kubernetes::NamespaceSelector;

/// Operator configuration, from command-line flags or environment variables
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ecr-credentials-refresher",
    about = "Keeps Amazon ECR image-pull secrets fresh across namespaces",
    version
)]
pub struct Config {
    /// Log level filter (overridden by RUST_LOG when set)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Path to the kubeconfig file; in-cluster config is inferred when unset
    #[arg(long, env = "KUBECONFIG_PATH")]
    pub path_to_kubeconfig: Option<PathBuf>,

    /// Interval between reconcile cycles (e.g. "30m", "12h")
    #[arg(long, env = "REFRESH_INTERVAL", value_parser = parse_duration, default_value = "12h")]
    pub refresh_interval: Duration,

    /// Comma-separated namespaces to write secrets to; empty means all namespaces
    #[arg(long, env = "TARGET_NAMESPACES", default_value = "")]
    pub target_namespaces: String,

    /// Maximum number of namespaces reconciled at once (at least 1)
    #[arg(long, env = "MAX_CONCURRENCY")]
    pub max_concurrency: Option<NonZeroUsize>,
}

impl Config {
    pub fn namespace_selector(&self) -> NamespaceSelector {
        NamespaceSelector::parse(&self.target_namespaces)
    }
}

/// Parse a duration such as "500ms", "45s", "30m" or "12h". Bare numbers are seconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (value_str, unit) = match s.find(|c: char| c.is_alphabetic()) {
        Some(pos) => (&s[..pos], &s[pos..]),
        None => (s, "s"),
    };

    let value: u64 = value_str
        .parse()
        .map_err(|e| format!("Invalid duration value '{}': {}", s, e))?;

    let duration = match unit.to_lowercase().as_str() {
        "ms" => Duration::from_millis(value),
        "s" | "sec" | "secs" => Duration::from_secs(value),
        "m" | "min" | "mins" => Duration::from_secs(value * 60),
        "h" | "hr" | "hrs" => Duration::from_secs(value * 3600),
        _ => return Err(format!("Unknown duration unit: {}", unit)),
    };

    if duration.is_zero() {
        return Err("Duration must be greater than zero".to_string());
    }
    Ok(duration)
}
