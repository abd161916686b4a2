//! Configuration validation.
//!
//! Serde handles the syntactic layer; this module checks semantics before a
//! config is accepted. All errors are collected and reported together, not
//! just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("upstream.url is required (set it in the config file or via UPSTREAM_URL)")]
    MissingUpstreamUrl,

    #[error("upstream.url {url:?} is not a valid URL: {source}")]
    InvalidUpstreamUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("upstream.url must use the http scheme, got {0:?}")]
    UnsupportedUpstreamScheme(String),

    #[error("upstream.url {0:?} has no host")]
    MissingUpstreamHost(String),

    #[error("auth.username and auth.password must be set together")]
    PartialCredentials,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("rewrite.max_buffer_bytes must be greater than zero")]
    ZeroRewriteBuffer,
}

/// Validate a parsed configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.url.is_empty() {
        errors.push(ValidationError::MissingUpstreamUrl);
    } else {
        match Url::parse(&config.upstream.url) {
            Ok(url) => {
                // The forwarding client speaks plain HTTP; TLS to the
                // upstream would fail at request time, so reject it here.
                if url.scheme() != "http" {
                    errors.push(ValidationError::UnsupportedUpstreamScheme(
                        url.scheme().to_string(),
                    ));
                }
                if url.host_str().is_none() {
                    errors.push(ValidationError::MissingUpstreamHost(
                        config.upstream.url.clone(),
                    ));
                }
            }
            Err(source) => {
                errors.push(ValidationError::InvalidUpstreamUrl {
                    url: config.upstream.url.clone(),
                    source,
                });
            }
        }
    }

    if config.auth.username.is_some() != config.auth.password.is_some() {
        errors.push(ValidationError::PartialCredentials);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.rewrite.max_buffer_bytes == 0 {
        errors.push(ValidationError::ZeroRewriteBuffer);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
