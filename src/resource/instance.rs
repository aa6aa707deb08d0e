//! Constructed resources and their callable members.

use std::fmt;

use thiserror::Error;

use crate::view::ViewError;

/// Argument and return type of resource methods.
pub type Value = serde_json::Value;

/// Errors raised from inside a resource method.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no method '{0}'")]
    UnknownMethod(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("view error: {0}")]
    View(#[from] ViewError),

    #[error("{0}")]
    Failed(String),
}

/// A constructed controller, model or library.
///
/// `methods` is the table consulted before any call: only names listed there
/// are dispatchable, so arbitrary strings from a URL never reach `call`
/// unless the resource opted in. The table belongs to the type, so it is
/// captured at registration and queried without constructing anything.
pub trait Resource: Send {
    /// Names of the callable members.
    fn methods() -> &'static [&'static str]
    where
        Self: Sized;

    /// Invoke a member by name.
    fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value, ActionError>;
}

impl fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").finish_non_exhaustive()
    }
}
