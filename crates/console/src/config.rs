#![forbid(unsafe_code)]

use crate::error::ConsoleError;
use catadmin_core::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8003";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub(crate) const DEFAULT_SESSION_DIRNAME: &str = ".catadmin";
pub(crate) const DEFAULT_SESSION_FILENAME: &str = "session.json";

pub const ENV_BASE_URL: &str = "CATADMIN_BASE_URL";
pub const ENV_SESSION_FILE: &str = "CATADMIN_SESSION_FILE";
pub const ENV_TIMEOUT_MS: &str = "CATADMIN_TIMEOUT_MS";
pub const ENV_MAX_DEPTH: &str = "CATADMIN_MAX_DEPTH";

/// Values given on the command line. Anything left `None` falls through to
/// the environment and then to the built-in default.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub max_depth: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
    pub max_depth: usize,
}

/// Reads a trimmed, non-empty process environment variable.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_session_file(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let base = env("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(DEFAULT_SESSION_DIRNAME)
        .join(DEFAULT_SESSION_FILENAME)
}

fn parse_env_number<N: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<N>, ConsoleError> {
    match env(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<N>()
            .map(Some)
            .map_err(|_| ConsoleError::Config(format!("{name} must be a positive integer, got {raw:?}"))),
    }
}

impl ConsoleConfig {
    pub fn from_process_env(overrides: ConfigOverrides) -> Result<Self, ConsoleError> {
        Self::resolve(overrides, env_var)
    }

    pub fn resolve(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConsoleError> {
        let base_url = overrides
            .base_url
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "base url must start with http:// or https://, got {base_url:?}"
            )));
        }

        let session_file = match overrides.session_file {
            Some(path) => path,
            None => env(ENV_SESSION_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_session_file(&env)),
        };

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => parse_env_number(&env, ENV_TIMEOUT_MS)?.unwrap_or(DEFAULT_TIMEOUT_MS),
        };
        if timeout_ms == 0 {
            return Err(ConsoleError::Config("timeout must be greater than zero".to_string()));
        }

        let max_depth = match overrides.max_depth {
            Some(depth) => depth,
            None => parse_env_number(&env, ENV_MAX_DEPTH)?.unwrap_or(DEFAULT_MAX_DEPTH),
        };
        if max_depth == 0 {
            return Err(ConsoleError::Config("max depth must be at least 1".to_string()));
        }

        Ok(Self {
            base_url,
            session_file,
            timeout: Duration::from_millis(timeout_ms),
            max_depth,
        })
    }
}
