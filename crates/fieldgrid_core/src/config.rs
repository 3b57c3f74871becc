//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_REQUEST_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the FieldGrid server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_request_size: usize,
    pub page_size: usize,
    pub token_ttl_secs: u64,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Parse a positive count, rejecting zero and garbage.
fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparseable.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("fieldgrid");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|s| parse_positive(&s))
                .unwrap_or(DEFAULT_MAX_REQUEST_SIZE),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|s| parse_positive(&s))
                .unwrap_or(DEFAULT_PAGE_SIZE),
            token_ttl_secs: env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Configuration suitable for tests: given db path, ephemeral port.
    pub fn for_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            port: 0,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}
