//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the front controller and admin API
//! - Wire up middleware (tracing, request ID, timeout, limits, headers)
//! - Map dispatch outcomes onto HTTP responses
//! - Apply live config updates (maintenance flag)
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::FrameworkConfig;
use crate::dispatch::{DispatchOutcome, DispatchRequest, Dispatcher};
use crate::http::request::{self, UuidRequestId};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resource::{ResourceError, Value};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: Arc<FrameworkConfig>,
    pub started_at: Instant,
}

/// HTTP server for the front controller and, when enabled, the admin API.
pub struct HttpServer {
    router: Router,
    admin_router: Option<Router>,
    config: FrameworkConfig,
    state: AppState,
    config_updates: Option<mpsc::UnboundedReceiver<FrameworkConfig>>,
}

impl HttpServer {
    pub fn new(config: FrameworkConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher,
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state.clone());
        let admin_router = config
            .admin
            .enabled
            .then(|| admin::setup_admin_router(state.clone()));

        Self {
            router,
            admin_router,
            config,
            state,
            config_updates: None,
        }
    }

    /// Receive reloaded configurations (see `ConfigWatcher`).
    pub fn with_config_updates(mut self, updates: mpsc::UnboundedReceiver<FrameworkConfig>) -> Self {
        self.config_updates = Some(updates);
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FrameworkConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", any(front_controller))
            .route("/{*path}", any(front_controller))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        let router = if config.security.enable_headers {
            router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
        } else {
            router
        };

        // Outermost first: the ID exists before the trace span opens.
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn admin_router(&self) -> Option<Router> {
        self.admin_router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Run the server, binding the admin API from config if it is enabled.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let admin_listener = match self.admin_router {
            Some(_) => Some(TcpListener::bind(&self.config.admin.bind_address).await?),
            None => None,
        };
        self.serve(listener, admin_listener, shutdown).await
    }

    /// Run with an already bound admin listener.
    pub async fn run_with_admin(
        self,
        listener: TcpListener,
        admin_listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        self.serve(listener, Some(admin_listener), shutdown).await
    }

    async fn serve(
        mut self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(mut updates) = self.config_updates.take() {
            let dispatcher = self.state.dispatcher.clone();
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        update = updates.recv() => match update {
                            Some(new_config) => apply_config_update(&dispatcher, &new_config),
                            None => break,
                        },
                        _ = stop.recv() => break,
                    }
                }
            });
        }

        let admin_task = match (self.admin_router, admin_listener) {
            (Some(router), Some(admin_listener)) => {
                let admin_addr = admin_listener.local_addr()?;
                tracing::info!(address = %admin_addr, "Admin API starting");
                let stop = shutdown.subscribe();
                Some(tokio::spawn(async move {
                    axum::serve(admin_listener, router)
                        .with_graceful_shutdown(Shutdown::wait(stop))
                        .await
                }))
            }
            _ => None,
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(Shutdown::wait(shutdown.subscribe()))
            .await?;

        if let Some(task) = admin_task {
            match task.await {
                Ok(result) => result?,
                Err(e) => tracing::error!(error = %e, "Admin API task failed"),
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Only the maintenance flag is applied live; everything else needs a restart.
fn apply_config_update(dispatcher: &Dispatcher, new_config: &FrameworkConfig) {
    let active = new_config.maintenance.enabled;
    let previous = dispatcher.gate().set_active(active);
    if previous != active {
        tracing::info!(active, "Maintenance mode changed by config reload");
    }
    tracing::debug!("Config reloaded; settings other than maintenance.enabled apply after restart");
}

/// Front controller: every path is dispatched to a controller.
async fn front_controller(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request::request_id(request.headers()).to_string();
    let client_ip = request::client_ip(request.headers(), peer, state.config.security.trust_forwarded_for);

    let path = match request.uri().path().trim_matches('/') {
        "" => state.config.app.default_controller.clone(),
        path => path.to_string(),
    };

    tracing::debug!(request_id = %request_id, client_ip = %client_ip, path = %path, "Dispatching request");

    let dispatch = DispatchRequest::new(path).client_ip(client_ip.to_string());
    let dispatcher = state.dispatcher.clone();
    let result = tokio::task::spawn_blocking(move || dispatcher.dispatch_controller(&dispatch)).await;

    let response = match result {
        Ok(Ok(DispatchOutcome::Invoked { value })) => value_response(StatusCode::OK, value),
        Ok(Ok(DispatchOutcome::NotFound | DispatchOutcome::MethodNotFound { .. })) => not_found_response(&state).await,
        Ok(Ok(DispatchOutcome::MaintenanceBlocked)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable for maintenance",
        )
            .into_response(),
        Ok(Err(ResourceError::InvalidPath(e))) => {
            tracing::debug!(request_id = %request_id, error = %e, "Rejected path");
            (StatusCode::BAD_REQUEST, "Invalid path").into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    metrics::record_response(response.status().as_u16());
    response
}

async fn not_found_response(state: &AppState) -> Response {
    let dispatcher = state.dispatcher.clone();
    match tokio::task::spawn_blocking(move || dispatcher.not_found()).await {
        Ok(Some(value)) => value_response(StatusCode::NOT_FOUND, value),
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Strings are sent as HTML, other values as JSON.
fn value_response(status: StatusCode, value: Value) -> Response {
    match value {
        Value::String(body) => (status, Html(body)).into_response(),
        Value::Null => status.into_response(),
        other => (status, Json(other)).into_response(),
    }
}
