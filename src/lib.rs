//! Resource resolution and dispatch for a small MVC framework.

pub mod config;
pub mod resource;
pub mod dispatch;
pub mod maintenance;
pub mod services;
pub mod view;
pub mod upload;
pub mod database;
pub mod util;
pub mod http;
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::schema::FrameworkConfig;
pub use dispatch::{DispatchOutcome, DispatchRequest, Dispatcher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resource::{ClassRegistry, Resource, ResourceKind};
