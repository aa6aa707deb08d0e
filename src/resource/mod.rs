//! Resource resolution.
//!
//! A resource is a controller, model or library addressed by a slash path.
//! Classes are registered up front in a [`ClassRegistry`]; the locator maps a
//! sanitized path onto a qualified class name and source file, and the
//! factory constructs instances with the shared [`Services`](crate::services::Services).

pub mod error;
pub mod factory;
pub mod instance;
pub mod kind;
pub mod locator;
pub mod path;
pub mod registry;

pub use error::ResourceError;
pub use factory::ResourceFactory;
pub use instance::{ActionError, Resource, Value};
pub use kind::ResourceKind;
pub use locator::{FileProbe, FsProbe, Locate, ResolvedResource, ResourceLocator};
pub use path::{sanitize, PathError, ResourcePath};
pub use registry::{ClassRegistry, Constructor};
