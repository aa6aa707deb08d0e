//! Admin API: status and maintenance-mode management.
//!
//! Served on its own listener and guarded by a bearer token.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/maintenance", get(get_maintenance))
        .route("/admin/maintenance/enable", post(enable_maintenance))
        .route("/admin/maintenance/disable", post(disable_maintenance))
        .route("/admin/maintenance/ips", post(add_allowed_ip))
        .route("/admin/maintenance/ips/{ip}", delete(remove_allowed_ip))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
