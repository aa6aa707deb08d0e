//! Class registry.
//!
//! Resources are compiled into the application, so "does this class exist"
//! is answered by a table built at startup instead of runtime reflection.
//! Each entry maps a qualified class name to its constructor and method table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::NamespaceConfig;
use crate::resource::instance::Resource;
use crate::resource::kind::ResourceKind;
use crate::resource::path::{sanitize, PathError, ResourcePath};
use crate::services::Services;

/// Builds a fresh instance from the collaborator bundle.
pub type Constructor = Arc<dyn Fn(&Services) -> Box<dyn Resource> + Send + Sync>;

/// Separator between namespace segments of a qualified class name.
pub const QUALIFIER: &str = "::";

/// Compute `{Prefix}::{segment}::{segment}` for a path.
pub fn qualified_name(kind: ResourceKind, namespaces: &NamespaceConfig, path: &ResourcePath) -> String {
    let mut name = kind.namespace(namespaces).to_string();
    for segment in path.segments() {
        name.push_str(QUALIFIER);
        name.push_str(segment);
    }
    name
}

#[derive(Clone)]
struct ClassEntry {
    kind: ResourceKind,
    constructor: Constructor,
    methods: &'static [&'static str],
}

/// Table of known resource classes.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    namespaces: NamespaceConfig,
    classes: HashMap<String, ClassEntry>,
}

impl ClassRegistry {
    pub fn new(namespaces: NamespaceConfig) -> Self {
        Self {
            namespaces,
            classes: HashMap::new(),
        }
    }

    /// Register a resource under `path`.
    ///
    /// The path goes through the same sanitizer as request paths, so a class
    /// registered here is reachable by exactly one sanitized path.
    pub fn register<F, R>(&mut self, kind: ResourceKind, path: &str, constructor: F) -> Result<&mut Self, PathError>
    where
        F: Fn(&Services) -> R + Send + Sync + 'static,
        R: Resource + 'static,
    {
        let path = sanitize(path)?;
        let name = qualified_name(kind, &self.namespaces, &path);
        let constructor: Constructor =
            Arc::new(move |services: &Services| -> Box<dyn Resource> { Box::new(constructor(services)) });

        let entry = ClassEntry {
            kind,
            constructor,
            methods: R::methods(),
        };

        if self.classes.insert(name.clone(), entry).is_some() {
            tracing::warn!(class = %name, "Resource class registered twice, keeping the last one");
        }
        Ok(self)
    }

    pub fn namespaces(&self) -> &NamespaceConfig {
        &self.namespaces
    }

    /// Returns true if a class with this qualified name is registered for `kind`.
    pub fn contains(&self, kind: ResourceKind, qualified: &str) -> bool {
        self.entry(kind, qualified).is_some()
    }

    pub fn constructor(&self, kind: ResourceKind, qualified: &str) -> Option<&Constructor> {
        self.entry(kind, qualified).map(|entry| &entry.constructor)
    }

    /// Callable members declared by the class, without constructing it.
    pub fn methods(&self, kind: ResourceKind, qualified: &str) -> Option<&'static [&'static str]> {
        self.entry(kind, qualified).map(|entry| entry.methods)
    }

    fn entry(&self, kind: ResourceKind, qualified: &str) -> Option<&ClassEntry> {
        self.classes.get(qualified).filter(|entry| entry.kind == kind)
    }

    /// Qualified names registered for `kind`, sorted.
    pub fn class_names(&self, kind: ResourceKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .classes
            .iter()
            .filter(|(_, entry)| entry.kind == kind)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("namespaces", &self.namespaces)
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::instance::{ActionError, Value};

    struct Noop;

    impl Resource for Noop {
        fn methods() -> &'static [&'static str] {
            &[]
        }

        fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
            Err(ActionError::UnknownMethod(method.to_string()))
        }
    }

    #[test]
    fn test_qualified_name() {
        let ns = NamespaceConfig::default();
        let path = sanitize("admin/blog").unwrap();
        assert_eq!(qualified_name(ResourceKind::Controller, &ns, &path), "Controller::admin::blog");
        assert_eq!(qualified_name(ResourceKind::Library, &ns, &path), "Library::admin::blog");
    }

    #[test]
    fn test_register_is_kind_scoped() {
        let mut registry = ClassRegistry::new(NamespaceConfig::default());
        registry.register(ResourceKind::Model, "/user/", |_| Noop).unwrap();

        assert!(registry.contains(ResourceKind::Model, "Model::user"));
        assert!(!registry.contains(ResourceKind::Controller, "Model::user"));
        assert!(registry.constructor(ResourceKind::Model, "Model::user").is_some());
        assert!(registry.methods(ResourceKind::Controller, "Model::user").is_none());
        assert_eq!(registry.class_names(ResourceKind::Model), vec!["Model::user"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_method_table_needs_no_instance() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static BUILT: AtomicUsize = AtomicUsize::new(0);

        struct Listed;

        impl Resource for Listed {
            fn methods() -> &'static [&'static str] {
                &["index", "show"]
            }

            fn call(&mut self, _method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
                Ok(Value::Null)
            }
        }

        let mut registry = ClassRegistry::new(NamespaceConfig::default());
        registry
            .register(ResourceKind::Controller, "blog", |_| {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Listed
            })
            .unwrap();

        let methods = registry.methods(ResourceKind::Controller, "Controller::blog").unwrap();
        assert_eq!(methods, &["index", "show"]);
        assert_eq!(BUILT.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_register_rejects_bad_path() {
        let mut registry = ClassRegistry::new(NamespaceConfig::default());
        assert!(registry.register(ResourceKind::Controller, "../x", |_| Noop).is_err());
        assert!(registry.is_empty());
    }
}
