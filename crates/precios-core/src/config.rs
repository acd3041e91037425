//! Environment-driven configuration for the server and CLI binaries.
//!
//! Parsing is decoupled from the process environment via an injectable
//! lookup so it can be tested with a plain `HashMap`, no `set_var` needed.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Post-request delay window, seconds.
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    /// Per-request timeout for outbound vendor fetches.
    pub request_timeout_secs: u64,
}

/// Load configuration from environment variables. Binaries load `.env`
/// (via `dotenvy`) before calling this.
///
/// # Errors
///
/// Returns [`ConfigError`] when a variable is present but unparseable.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_app_config_from_env()
}

/// Load configuration from variables already in the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] when a variable is present but unparseable.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_owned());

    let bind_addr = {
        let raw = or_default("PRECIOS_BIND_ADDR", "0.0.0.0:3000");
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "PRECIOS_BIND_ADDR".to_owned(),
                reason: e.to_string(),
            })?
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_owned(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_owned(),
            reason: e.to_string(),
        })
    };

    let min_delay_secs = parse_f64("PRECIOS_MIN_DELAY_SECS", "2")?;
    let max_delay_secs = parse_f64("PRECIOS_MAX_DELAY_SECS", "5")?;
    if max_delay_secs < min_delay_secs {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRECIOS_MAX_DELAY_SECS".to_owned(),
            reason: format!("window upper bound {max_delay_secs} below lower bound {min_delay_secs}"),
        });
    }

    Ok(AppConfig {
        bind_addr,
        log_level: or_default("PRECIOS_LOG_LEVEL", "info"),
        min_delay_secs,
        max_delay_secs,
        request_timeout_secs: parse_u64("PRECIOS_REQUEST_TIMEOUT_SECS", "25")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, std::env::VarError> + 'a {
        move |key| {
            vars.get(key)
                .map(|v| (*v).to_owned())
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let vars = HashMap::new();
        let config = build_app_config(lookup(&vars)).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.log_level, "info");
        assert!((config.min_delay_secs - 2.0).abs() < f64::EPSILON);
        assert!((config.max_delay_secs - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.request_timeout_secs, 25);
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = HashMap::new();
        vars.insert("PRECIOS_BIND_ADDR", "127.0.0.1:8080");
        vars.insert("PRECIOS_MIN_DELAY_SECS", "0");
        vars.insert("PRECIOS_MAX_DELAY_SECS", "1.5");
        let config = build_app_config(lookup(&vars)).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!((config.max_delay_secs - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_inverted_delay_window() {
        let mut vars = HashMap::new();
        vars.insert("PRECIOS_MIN_DELAY_SECS", "5");
        vars.insert("PRECIOS_MAX_DELAY_SECS", "2");
        assert!(matches!(
            build_app_config(lookup(&vars)),
            Err(ConfigError::InvalidEnvVar { var, .. }) if var == "PRECIOS_MAX_DELAY_SECS"
        ));
    }

    #[test]
    fn rejects_garbage_bind_addr() {
        let mut vars = HashMap::new();
        vars.insert("PRECIOS_BIND_ADDR", "not-an-addr");
        assert!(build_app_config(lookup(&vars)).is_err());
    }
}
