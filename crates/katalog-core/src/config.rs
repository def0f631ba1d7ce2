use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://zadatak.konovo.rs";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// development config pointed at the public upstream.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let bind_addr = or_default("KATALOG_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("KATALOG_BIND_ADDR", e.to_string()))?;

    let upstream_timeout_secs = or_default("KATALOG_UPSTREAM_TIMEOUT_SECS", "15")
        .parse::<u64>()
        .map_err(|e| invalid("KATALOG_UPSTREAM_TIMEOUT_SECS", e.to_string()))?;
    if upstream_timeout_secs == 0 {
        return Err(invalid(
            "KATALOG_UPSTREAM_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }

    // Parsed and validated by the upstream client at startup.
    let upstream_base_url = or_default("KATALOG_UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL)
        .trim()
        .to_string();

    let env = parse_environment(&or_default("KATALOG_ENV", "development"));
    let log_level = or_default("KATALOG_LOG_LEVEL", "info");
    let upstream_user_agent =
        or_default("KATALOG_UPSTREAM_USER_AGENT", "katalog/0.1 (catalog-gateway)");
    let categories_path = lookup("KATALOG_CATEGORIES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        upstream_timeout_secs,
        upstream_user_agent,
        categories_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
