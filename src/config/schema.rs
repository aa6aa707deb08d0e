//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the framework.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the framework.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application layout and dispatch defaults.
    pub app: AppConfig,

    /// Namespace prefixes used to build qualified class names.
    pub namespaces: NamespaceConfig,

    /// View lookup and caching.
    pub views: ViewConfig,

    /// Maintenance mode and the allow-list file.
    pub maintenance: MaintenanceConfig,

    /// Upload directory and size limit.
    pub upload: UploadConfig,

    /// Database connection parameters.
    pub database: DatabaseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Application layout.
///
/// Resources live under `{app_dir}/{controller|model|library}/{path}.{extension}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory of the application sources.
    pub app_dir: PathBuf,

    /// Extension of resource source files (without the dot).
    pub extension: String,

    /// Controller dispatched for the empty path.
    pub default_controller: String,

    /// Controller dispatched when nothing else matched.
    pub not_found_controller: String,

    /// Language used by `Dispatcher::language` when none is given.
    pub default_language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("app"),
            extension: "rs".to_string(),
            default_controller: "home".to_string(),
            not_found_controller: "_404".to_string(),
            default_language: "en".to_string(),
        }
    }
}

/// Per-kind namespace prefixes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub controller: String,
    pub model: String,
    pub library: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            controller: "Controller".to_string(),
            model: "Model".to_string(),
            library: "Library".to_string(),
        }
    }
}

/// View configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Directory holding view templates, relative to the working directory.
    pub directory: PathBuf,

    /// Template file extension (without the dot).
    pub extension: String,

    /// Global switch for the template cache.
    pub cache_enabled: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("app/view"),
            extension: "html".to_string(),
            cache_enabled: true,
        }
    }
}

/// Maintenance mode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Start with maintenance mode active.
    pub enabled: bool,

    /// Line-oriented file holding the allowed IP addresses.
    pub whitelist_path: PathBuf,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            whitelist_path: PathBuf::from("system/maintenance_whitelist.txt"),
        }
    }
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Destination directory for uploaded files.
    pub directory: PathBuf,

    /// Maximum file size in kB. `None` disables the check.
    pub max_size_kb: Option<f64>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("public/uploads"),
            max_size_kb: None,
        }
    }
}

/// Database connection parameters.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Driver name (e.g., "mysql").
    pub dbms: String,

    /// Database server host.
    pub server: String,

    /// Database name. An empty name means no database is configured.
    pub name: String,

    pub username: String,

    pub password: String,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Take the client IP from X-Forwarded-For (only behind a trusted proxy).
    pub trust_forwarded_for: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
            trust_forwarded_for: false,
        }
    }
}
