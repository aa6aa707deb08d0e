//! Resource instantiation.

use std::sync::Arc;

use crate::resource::error::ResourceError;
use crate::resource::instance::Resource;
use crate::resource::locator::ResolvedResource;
use crate::resource::registry::ClassRegistry;
use crate::services::Services;

/// Builds instances of located resources.
#[derive(Debug, Clone)]
pub struct ResourceFactory {
    registry: Arc<ClassRegistry>,
}

impl ResourceFactory {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self { registry }
    }

    /// Construct the resource. Absent resources are reported, never replaced
    /// by a placeholder, and no method is invoked here.
    pub fn create(&self, resolved: &ResolvedResource, services: &Services) -> Result<Box<dyn Resource>, ResourceError> {
        let not_found = || ResourceError::NotFound {
            kind: resolved.kind,
            path: resolved.path.to_string(),
        };

        if !resolved.exists {
            tracing::debug!(class = %resolved.class_name, "Refusing to construct a missing resource");
            return Err(not_found());
        }

        let constructor = self
            .registry
            .constructor(resolved.kind, &resolved.class_name)
            .ok_or_else(not_found)?;

        tracing::debug!(class = %resolved.class_name, "Constructing resource");
        Ok(constructor(services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamespaceConfig;
    use crate::resource::instance::{ActionError, Value};
    use crate::resource::kind::ResourceKind;
    use crate::resource::path::sanitize;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static BUILT: AtomicUsize = AtomicUsize::new(0);

    struct Counter;

    impl Resource for Counter {
        fn methods() -> &'static [&'static str] {
            &["index"]
        }

        fn call(&mut self, _method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
            Ok(Value::from(1))
        }
    }

    fn resolved(path: &str, exists: bool) -> ResolvedResource {
        ResolvedResource {
            kind: ResourceKind::Controller,
            path: sanitize(path).unwrap(),
            class_name: format!("Controller::{path}"),
            file: PathBuf::from(format!("app/controller/{path}.rs")),
            exists,
            methods: &["index"],
        }
    }

    fn factory() -> ResourceFactory {
        let mut registry = ClassRegistry::new(NamespaceConfig::default());
        registry
            .register(ResourceKind::Controller, "counter", |_| {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Counter
            })
            .unwrap();
        ResourceFactory::new(Arc::new(registry))
    }

    #[test]
    fn test_missing_resource_is_not_constructed() {
        let factory = factory();
        let services = Services::detached();
        let before = BUILT.load(Ordering::SeqCst);

        let err = factory.create(&resolved("counter", false), &services).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { kind: ResourceKind::Controller, .. }));
        assert_eq!(BUILT.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_unregistered_class_is_not_found() {
        let factory = factory();
        let err = factory.create(&resolved("other", true), &Services::detached()).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { ref path, .. } if path == "other"));
    }

    #[test]
    fn test_creates_fresh_instance() {
        let factory = factory();
        let mut instance = factory.create(&resolved("counter", true), &Services::detached()).unwrap();
        assert_eq!(instance.call("index", vec![]).unwrap(), Value::from(1));
    }
}
