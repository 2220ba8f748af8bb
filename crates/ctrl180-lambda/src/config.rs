use std::env;
use std::path::PathBuf;

use serde::Serialize;

pub const DEFAULT_TEMPLATE_DIRS: &str = "public:../public:../../public";
pub const DEFAULT_CHART_TIMEOUT_MS: u64 = 9_000;
pub const DEFAULT_CHART_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Service settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Template directories, searched in order.
    pub template_dirs: Vec<PathBuf>,
    pub chart_timeout_ms: u64,
    pub chart_max_bytes: u64,
    /// Reject payloads whose category codes cannot be resolved instead of
    /// falling back to the default template pair.
    pub strict_template: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values use defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dirs = lookup("CTRL_TEMPLATE_DIRS")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_DIRS.to_string());

        Self {
            template_dirs: dirs
                .split(':')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect(),
            chart_timeout_ms: lookup("CTRL_CHART_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_CHART_TIMEOUT_MS),
            chart_max_bytes: lookup("CTRL_CHART_MAX_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_CHART_MAX_BYTES),
            strict_template: lookup("CTRL_STRICT_TEMPLATE")
                .is_some_and(|v| is_truthy(&v)),
        }
    }
}

/// `1`, `true`, `yes` and `on`, case-insensitively.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
