use crate::app_config::{AppConfig, Environment, UpstreamConfig};
use crate::upstream::Upstream;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value.
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
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Per-upstream timeout and retry variables fall
/// back to the global `TIKBOARD_REQUEST_TIMEOUT_SECS` / `TIKBOARD_MAX_RETRIES`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TIKBOARD_ENV", "development"))?;

    let bind_addr = or_default("TIKBOARD_BIND_ADDR", "0.0.0.0:8005")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TIKBOARD_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TIKBOARD_LOG_LEVEL", "info");

    let default_timeout_secs = parse_u64("TIKBOARD_REQUEST_TIMEOUT_SECS", "30")?;
    let default_max_retries = parse_u32("TIKBOARD_MAX_RETRIES", "2")?;
    let backoff_base_ms = parse_u64("TIKBOARD_RETRY_BACKOFF_BASE_MS", "1000")?;
    if default_timeout_secs == 0 {
        return Err(invalid(
            "TIKBOARD_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let upstream_config =
        |upstream: Upstream, default_url: &str| -> Result<UpstreamConfig, ConfigError> {
            let token = upstream.env_token();
            let url_var = format!("TIKBOARD_{token}_URL");
            let timeout_var = format!("TIKBOARD_{token}_TIMEOUT_SECS");
            let retries_var = format!("TIKBOARD_{token}_MAX_RETRIES");

            let base_url = or_default(&url_var, default_url);
            if base_url.trim().is_empty() {
                return Err(invalid(&url_var, "must not be empty".to_string()));
            }
            let timeout_secs = parse_u64(&timeout_var, &default_timeout_secs.to_string())?;
            if timeout_secs == 0 {
                return Err(invalid(&timeout_var, "must be greater than zero".to_string()));
            }
            let max_retries = parse_u32(&retries_var, &default_max_retries.to_string())?;

            Ok(UpstreamConfig {
                base_url,
                timeout_secs,
                max_retries,
                backoff_base_ms,
            })
        };

    let users = upstream_config(Upstream::Users, "http://localhost:8081")?;
    let accounts = upstream_config(Upstream::Accounts, "http://localhost:3000")?;
    let metrics = upstream_config(Upstream::Metrics, "http://localhost:8000")?;
    let dashboard = upstream_config(Upstream::Dashboard, "http://localhost:8080")?;

    let health_timeout_secs = parse_u64("TIKBOARD_HEALTH_TIMEOUT_SECS", "2")?;
    if health_timeout_secs == 0 {
        return Err(invalid(
            "TIKBOARD_HEALTH_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let consolidation_deadline_ms = match lookup("TIKBOARD_CONSOLIDATION_DEADLINE_MS") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| invalid("TIKBOARD_CONSOLIDATION_DEADLINE_MS", e.to_string()))?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        users,
        accounts,
        metrics,
        dashboard,
        health_timeout_secs,
        consolidation_deadline_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TIKBOARD_ENV".to_string(),
            reason: format!("expected development, test or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
