//! Configuration validation
//!
//! Validates dexcache configuration for correctness:
//! - Upstream base URL is http(s)
//! - Limits and timeouts are non-zero
//! - Backoff settings are coherent

use super::dexcache_config::{DexCacheConfig, PopulationConfig, UpstreamConfig};
use crate::DexCacheError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub section: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref section) = self.section {
            write!(f, "{}.{}: {}", section, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a dexcache configuration, collecting every problem
pub fn validate_config(config: &DexCacheConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(mut upstream_errors) = validate_upstream(&config.upstream) {
        errors.append(&mut upstream_errors);
    }
    if let Err(mut population_errors) = validate_population(&config.population) {
        errors.append(&mut population_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and convert failures into a single crate error
pub fn validate_config_result(config: &DexCacheConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let details = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        DexCacheError::Config(format!("Invalid configuration:\n{}", details))
    })
}

fn validate_upstream(upstream: &UpstreamConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !is_valid_http_url(&upstream.base_url) {
        errors.push(
            ValidationError::new(
                "base_url",
                format!("Invalid HTTP URL: {}", upstream.base_url),
            )
            .in_section("upstream"),
        );
    }

    if upstream.index_limit == 0 {
        errors.push(
            ValidationError::new("index_limit", "Index limit must be greater than 0")
                .in_section("upstream"),
        );
    }

    if upstream.request_timeout_secs == 0 {
        errors.push(
            ValidationError::new(
                "request_timeout_secs",
                "Request timeout must be greater than 0",
            )
            .in_section("upstream"),
        );
    }

    if upstream.user_agent.trim().is_empty() {
        errors.push(
            ValidationError::new("user_agent", "User agent cannot be empty")
                .in_section("upstream"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_population(population: &PopulationConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !population.multiplier.is_finite() || population.multiplier < 1.0 {
        errors.push(
            ValidationError::new(
                "multiplier",
                format!("Multiplier must be >= 1.0, got {}", population.multiplier),
            )
            .in_section("population"),
        );
    }

    if population.initial_backoff_ms > population.max_backoff_ms {
        errors.push(
            ValidationError::new(
                "initial_backoff_ms",
                format!(
                    "Initial backoff ({}ms) exceeds max backoff ({}ms)",
                    population.initial_backoff_ms, population.max_backoff_ms
                ),
            )
            .in_section("population"),
        );
    }

    if population.event_channel_capacity == 0 {
        errors.push(
            ValidationError::new(
                "event_channel_capacity",
                "Event channel capacity must be greater than 0",
            )
            .in_section("population"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}
