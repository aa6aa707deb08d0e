//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that dispatch defaults are usable resource paths
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrameworkConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::FrameworkConfig;
use crate::resource::path::sanitize;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} '{value}' is not a valid resource path")]
    InvalidResourcePath { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("admin API enabled with the placeholder api_key")]
    PlaceholderApiKey,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &FrameworkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener", &config.listener.bind_address);
    if config.admin.enabled {
        check_address(&mut errors, "admin", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }
    if config.observability.metrics_enabled {
        check_address(&mut errors, "metrics", &config.observability.metrics_address);
    }

    check_resource_path(&mut errors, "app.default_controller", &config.app.default_controller);
    check_resource_path(&mut errors, "app.not_found_controller", &config.app.not_found_controller);

    if config.app.extension.is_empty() {
        errors.push(ValidationError::Empty { field: "app.extension" });
    }
    for (field, prefix) in [
        ("namespaces.controller", &config.namespaces.controller),
        ("namespaces.model", &config.namespaces.model),
        ("namespaces.library", &config.namespaces.library),
    ] {
        if prefix.is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }
    if config.maintenance.whitelist_path.as_os_str().is_empty() {
        errors.push(ValidationError::Empty { field: "maintenance.whitelist_path" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

// The configured name must already be in sanitized form, otherwise the
// controller it names could never be located.
fn check_resource_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match sanitize(value) {
        Ok(path) if path.as_str() == value => {}
        _ => errors.push(ValidationError::InvalidResourcePath {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FrameworkConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FrameworkConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.app.default_controller = "../home".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero { field: "timeouts.request_secs" }));
    }

    #[test]
    fn test_admin_requires_real_key() {
        let mut config = FrameworkConfig::default();
        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::PlaceholderApiKey]);

        config.admin.api_key = "s3cret".into();
        assert!(validate_config(&config).is_ok());
    }
}
