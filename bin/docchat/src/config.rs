//! CLI configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Runtime configuration for the docchat CLI.
///
/// Every field has a sensible default so the tool works out-of-the-box
/// against a local backend without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (default: `"http://127.0.0.1:5000"`).
    pub api_base: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,reqwest=warn"`.
    pub log_level: String,

    /// Per-request timeout in seconds (default: 120; replies that carry
    /// generated artifacts can take a while).
    pub timeout_secs: u64,

    /// Override for the session-id data directory; unset means the
    /// platform default.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            api_base: env_or("DOCCHAT_API", "http://127.0.0.1:5000"),
            log_level: env_or("DOCCHAT_LOG", "info"),
            timeout_secs: parse_env("DOCCHAT_TIMEOUT_SECS", 120),
            data_dir: std::env::var("DOCCHAT_DATA_DIR").ok().map(PathBuf::from),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
