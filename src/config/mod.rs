//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FrameworkConfig (validated, immutable)
//!     → passed explicitly to the sanitizer, locator, dispatcher and server
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server applies the runtime-switchable parts (maintenance mode)
//! ```
//!
//! # Design Decisions
//! - No global configuration; every component receives what it needs
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::AdminConfig;
pub use schema::AppConfig;
pub use schema::DatabaseConfig;
pub use schema::FrameworkConfig;
pub use schema::MaintenanceConfig;
pub use schema::NamespaceConfig;
pub use schema::ObservabilityConfig;
pub use schema::UploadConfig;
pub use schema::ViewConfig;
