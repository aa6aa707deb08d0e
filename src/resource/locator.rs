//! Resource location.
//!
//! # Responsibilities
//! - Compute the qualified class name for (kind, path)
//! - Compute the source file location for (kind, path)
//! - Decide existence: class registered AND (for file-backed kinds) file present
//! - Refuse the library literally named after the reserved name
//!
//! # Design Decisions
//! - Read-only: the registry is frozen and the probe only stats files, so one
//!   locator is shared by every request without locking
//! - `Locate` is the seam the dispatcher depends on, which lets tests count
//!   how often resolution was attempted

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::resource::error::ResourceError;
use crate::resource::kind::ResourceKind;
use crate::resource::path::ResourcePath;
use crate::resource::registry::{qualified_name, ClassRegistry};

/// Library name that would collide with the library namespace itself.
pub const RESERVED_LIBRARY_NAME: &str = "library";

/// Answers whether a source file exists.
pub trait FileProbe: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_file(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Outcome of locating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub kind: ResourceKind,
    pub path: ResourcePath,
    /// Fully qualified class name, e.g. `Controller::admin::blog`.
    pub class_name: String,
    /// Expected source file location.
    pub file: PathBuf,
    pub exists: bool,
    /// Declared method table; empty when the class is not registered.
    pub methods: &'static [&'static str],
}

impl ResolvedResource {
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains(&method)
    }
}

/// Resolves (kind, path) pairs.
pub trait Locate: Send + Sync {
    fn locate(&self, kind: ResourceKind, path: &ResourcePath) -> Result<ResolvedResource, ResourceError>;
}

/// Registry + filesystem backed locator.
pub struct ResourceLocator {
    registry: Arc<ClassRegistry>,
    app_dir: PathBuf,
    extension: String,
    probe: Arc<dyn FileProbe>,
}

impl ResourceLocator {
    pub fn new(config: &AppConfig, registry: Arc<ClassRegistry>) -> Self {
        Self {
            registry,
            app_dir: config.app_dir.clone(),
            extension: config.extension.clone(),
            probe: Arc::new(FsProbe),
        }
    }

    /// Replace the filesystem probe.
    pub fn with_probe(self, probe: impl FileProbe + 'static) -> Self {
        self.with_shared_probe(Arc::new(probe))
    }

    pub fn with_shared_probe(mut self, probe: Arc<dyn FileProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// `{app_dir}/{kind}/{path}.{extension}`
    pub fn file_path(&self, kind: ResourceKind, path: &ResourcePath) -> PathBuf {
        let mut file = self.app_dir.join(kind.dir_name());
        for segment in path.segments() {
            file.push(segment);
        }
        file.set_extension(&self.extension);
        file
    }
}

impl Locate for ResourceLocator {
    fn locate(&self, kind: ResourceKind, path: &ResourcePath) -> Result<ResolvedResource, ResourceError> {
        // Nested paths such as `vendor/library` are ordinary libraries.
        if kind == ResourceKind::Library && path.as_str() == RESERVED_LIBRARY_NAME {
            tracing::warn!(path = %path, "The library shouldn't be named library");
            return Err(ResourceError::ReservedName(path.to_string()));
        }

        let class_name = qualified_name(kind, self.registry.namespaces(), path);
        let file = self.file_path(kind, path);

        let methods = self.registry.methods(kind, &class_name);
        let class_exists = methods.is_some();
        let exists = if kind.is_file_backed() {
            class_exists && self.probe.is_file(&file)
        } else {
            class_exists
        };

        tracing::trace!(
            kind = %kind,
            class = %class_name,
            file = %file.display(),
            class_exists,
            exists,
            "Resource located"
        );

        Ok(ResolvedResource {
            kind,
            path: path.clone(),
            class_name,
            file,
            exists,
            methods: methods.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamespaceConfig;
    use crate::resource::instance::{ActionError, Resource, Value};
    use crate::resource::path::sanitize;
    use std::collections::HashSet;

    struct Empty;

    impl Resource for Empty {
        fn methods() -> &'static [&'static str] {
            &["index"]
        }

        fn call(&mut self, _method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
            Ok(Value::Null)
        }
    }

    fn locator(files: &[&str]) -> ResourceLocator {
        let mut registry = ClassRegistry::new(NamespaceConfig::default());
        registry
            .register(ResourceKind::Controller, "blog", |_| Empty)
            .unwrap()
            .register(ResourceKind::Controller, "orphan", |_| Empty)
            .unwrap()
            .register(ResourceKind::Model, "user", |_| Empty)
            .unwrap()
            .register(ResourceKind::Library, "text/slug", |_| Empty)
            .unwrap()
            .register(ResourceKind::Library, "library", |_| Empty)
            .unwrap()
            .register(ResourceKind::Library, "vendor/library", |_| Empty)
            .unwrap();

        let files: HashSet<PathBuf> = files.iter().map(PathBuf::from).collect();
        ResourceLocator::new(&AppConfig::default(), Arc::new(registry))
            .with_probe(move |p: &Path| files.contains(p))
    }

    #[test]
    fn test_controller_needs_class_and_file() {
        let locator = locator(&["app/controller/blog.rs", "app/controller/ghost.rs"]);

        let blog = locator.locate(ResourceKind::Controller, &sanitize("blog").unwrap()).unwrap();
        assert!(blog.exists);
        assert!(blog.has_method("index"));
        assert_eq!(blog.class_name, "Controller::blog");
        assert_eq!(blog.file, PathBuf::from("app/controller/blog.rs"));

        // Registered, no file.
        let orphan = locator.locate(ResourceKind::Controller, &sanitize("orphan").unwrap()).unwrap();
        assert!(!orphan.exists);

        // File, no class.
        let ghost = locator.locate(ResourceKind::Controller, &sanitize("ghost").unwrap()).unwrap();
        assert!(!ghost.exists);
        assert!(!ghost.has_method("index"));
    }

    #[test]
    fn test_nested_file_path() {
        let locator = locator(&[]);
        let resolved = locator.locate(ResourceKind::Model, &sanitize("shop/cart").unwrap()).unwrap();
        assert_eq!(resolved.file, PathBuf::from("app/model/shop/cart.rs"));
        assert_eq!(resolved.class_name, "Model::shop::cart");
    }

    #[test]
    fn test_library_ignores_files() {
        let locator = locator(&[]);
        let slug = locator.locate(ResourceKind::Library, &sanitize("text/slug").unwrap()).unwrap();
        assert!(slug.exists);
        assert_eq!(slug.class_name, "Library::text::slug");
    }

    #[test]
    fn test_reserved_library_name() {
        let locator = locator(&["app/library/library.rs"]);

        // Registered, still refused.
        let err = locator.locate(ResourceKind::Library, &sanitize("library").unwrap()).unwrap_err();
        assert!(matches!(err, ResourceError::ReservedName(ref p) if p == "library"));

        // Only the bare name is reserved.
        let nested = locator.locate(ResourceKind::Library, &sanitize("vendor/library").unwrap()).unwrap();
        assert!(nested.exists);
        assert_eq!(nested.class_name, "Library::vendor::library");

        // Only libraries are affected.
        let model = locator.locate(ResourceKind::Model, &sanitize("library").unwrap()).unwrap();
        assert!(!model.exists);
    }

    #[test]
    fn test_kind_mismatch_is_absent() {
        let locator = locator(&["app/model/blog.rs"]);
        let resolved = locator.locate(ResourceKind::Model, &sanitize("blog").unwrap()).unwrap();
        assert!(!resolved.exists);
    }
}
