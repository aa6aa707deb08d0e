//! Dispatch inputs and outcomes.

use serde::Serialize;

use crate::resource::instance::Value;

/// Method invoked when the request names none.
pub const DEFAULT_METHOD: &str = "index";

/// One controller dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    /// Raw, unsanitized path (e.g. the URI path).
    pub path: String,
    /// Requester address as seen by the HTTP layer.
    pub client_ip: String,
    /// Explicit method for a whole-path match; `index` when absent.
    pub method: Option<String>,
    /// Arguments passed to the invoked method, in order.
    pub args: Vec<Value>,
}

impl DispatchRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = ip.into();
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

/// Result of a controller dispatch, for the HTTP layer to map onto a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A controller method ran and returned this value.
    Invoked { value: Value },
    /// Neither the whole path nor its parent is a controller.
    NotFound,
    /// The controller exists but has no such method.
    MethodNotFound { controller: String, method: String },
    /// Maintenance mode is active and the client is not allowed.
    MaintenanceBlocked,
}

impl DispatchOutcome {
    pub fn invoked(value: Value) -> Self {
        Self::Invoked { value }
    }

    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Invoked { .. } => "invoked",
            Self::NotFound => "not_found",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::MaintenanceBlocked => "maintenance_blocked",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::MethodNotFound { .. })
    }
}
