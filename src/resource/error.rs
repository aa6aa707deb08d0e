//! Resource resolution errors.

use thiserror::Error;

use crate::resource::instance::ActionError;
use crate::resource::kind::ResourceKind;
use crate::resource::path::PathError;

/// Errors surfaced by locating, constructing or invoking a resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("a library must not be named '{0}'")]
    ReservedName(String),

    #[error("the {kind} '{path}' doesn't exist")]
    NotFound { kind: ResourceKind, path: String },

    #[error("the {kind} '{path}' doesn't have a '{method}' method")]
    MethodNotFound {
        kind: ResourceKind,
        path: String,
        method: String,
    },

    #[error("{class}::{method} failed: {source}")]
    Action {
        class: String,
        method: String,
        #[source]
        source: ActionError,
    },
}
