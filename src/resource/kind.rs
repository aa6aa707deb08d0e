//! Resource kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::NamespaceConfig;

/// The kind of a locatable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Controller,
    Model,
    Library,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Controller, Self::Model, Self::Library];

    /// Directory name under the application root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Model => "model",
            Self::Library => "library",
        }
    }

    /// Whether existence also requires the source file on disk.
    pub fn is_file_backed(self) -> bool {
        !matches!(self, Self::Library)
    }

    /// Namespace prefix for this kind.
    pub fn namespace(self, namespaces: &NamespaceConfig) -> &str {
        match self {
            Self::Controller => &namespaces.controller,
            Self::Model => &namespaces.model,
            Self::Library => &namespaces.library,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
