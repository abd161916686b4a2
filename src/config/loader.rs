//! Configuration loading from disk and the environment.
//!
//! The TOML file is optional; the original deployment of this proxy was
//! configured entirely through environment variables, so those override
//! whatever the file (or the defaults) provide.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate the configuration.
///
/// Without a path the defaults are used as the base, which means a bare
/// `UPSTREAM_URL=... webdav-timefix` invocation is a complete deployment.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config: ProxyConfig = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment overrides, matching the variable names the proxy has always
/// been deployed with.
fn apply_env_overrides(config: &mut ProxyConfig) {
    if let Ok(url) = env::var("UPSTREAM_URL") {
        config.upstream.url = url;
    }
    if let Ok(username) = env::var("PROXY_USERNAME") {
        config.auth.username = Some(username);
    }
    if let Ok(password) = env::var("PROXY_PASSWORD") {
        config.auth.password = Some(password);
    }
    if let Ok(addr) = env::var("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/webdav-timefix.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_errors_render_in_display() {
        // No file and (normally) no UPSTREAM_URL in the test environment.
        if env::var("UPSTREAM_URL").is_ok() {
            return;
        }
        let err = load_config(None).unwrap_err();
        assert!(err.to_string().contains("upstream.url"));
    }
}
