use std::net::IpAddr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::maintenance::StoreError;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub maintenance: bool,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct MaintenanceStatus {
    pub active: bool,
    pub allowed_ips: Vec<String>,
}

#[derive(Serialize)]
pub struct ToggleResult {
    pub active: bool,
    pub previous: bool,
}

#[derive(Deserialize)]
pub struct AllowIpRequest {
    pub ip: String,
}

#[derive(Serialize)]
pub struct AllowListChange {
    pub ip: String,
    pub changed: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let maintenance = state.dispatcher.gate().is_active();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if maintenance { "maintenance" } else { "operational" },
        maintenance,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_maintenance(State(state): State<AppState>) -> Response {
    let gate = state.dispatcher.gate();
    match gate.allowed_ips() {
        Ok(allowed_ips) => Json(MaintenanceStatus {
            active: gate.is_active(),
            allowed_ips,
        })
        .into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn enable_maintenance(State(state): State<AppState>) -> Json<ToggleResult> {
    toggle(&state, true)
}

pub async fn disable_maintenance(State(state): State<AppState>) -> Json<ToggleResult> {
    toggle(&state, false)
}

fn toggle(state: &AppState, active: bool) -> Json<ToggleResult> {
    let previous = state.dispatcher.gate().set_active(active);
    tracing::info!(active, previous, "Maintenance mode set via admin API");
    Json(ToggleResult { active, previous })
}

pub async fn add_allowed_ip(
    State(state): State<AppState>,
    Json(request): Json<AllowIpRequest>,
) -> Response {
    let Ok(ip) = request.ip.trim().parse::<IpAddr>() else {
        return (StatusCode::BAD_REQUEST, "Invalid IP address").into_response();
    };
    let ip = ip.to_string();

    match state.dispatcher.gate().add_allowed_ip(&ip) {
        Ok(changed) => {
            let status = if changed { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(AllowListChange { ip, changed })).into_response()
        }
        Err(e) => store_failure(e),
    }
}

pub async fn remove_allowed_ip(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Response {
    let Ok(ip) = ip.trim().parse::<IpAddr>() else {
        return (StatusCode::BAD_REQUEST, "Invalid IP address").into_response();
    };
    let ip = ip.to_string();

    match state.dispatcher.gate().remove_allowed_ip(&ip) {
        Ok(true) => Json(AllowListChange { ip, changed: true }).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "IP not in allow-list").into_response(),
        Err(e) => store_failure(e),
    }
}

fn store_failure(e: StoreError) -> Response {
    tracing::error!(error = %e, "Allow-list store failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Allow-list store failed").into_response()
}
