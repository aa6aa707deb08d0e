//! Collaborator services handed to every constructed resource.
//!
//! The dispatcher never calls into these itself; it only forwards them. The
//! field order of [`Services`] is the constructor argument order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::dispatch::Dispatcher;
use crate::resource::instance::{ActionError, Value};
use crate::upload::Upload;
use crate::view::ViewGateway;

/// Opaque key/value store (session data, application cache).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str) -> Option<Value>;
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Concurrent in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.inner.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.inner.remove(key).map(|(_, v)| v)
    }
}

/// A named application extension.
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;
    fn call(&self, args: Vec<Value>) -> Result<Value, ActionError>;
}

/// Registered extensions, by name.
#[derive(Clone, Default)]
pub struct Extensions {
    items: HashMap<String, Arc<dyn Extension>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: impl Extension + 'static) -> &mut Self {
        let extension: Arc<dyn Extension> = Arc::new(extension);
        self.items.insert(extension.name().to_string(), extension);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.items.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.items.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Constructor arguments of controllers and models.
#[derive(Clone)]
pub struct Services {
    /// Loads models, libraries, languages and other controllers.
    pub loader: Dispatcher,
    pub view: ViewGateway,
    pub session: Arc<dyn KeyValueStore>,
    pub cache: Arc<dyn KeyValueStore>,
    pub upload: Arc<Upload>,
    pub extensions: Arc<Extensions>,
}

impl Services {
    /// Services backed by an empty registry and in-memory collaborators.
    pub fn detached() -> Self {
        Dispatcher::builder()
            .allow_list(crate::maintenance::MemoryAllowList::new())
            .build()
            .services()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Shout;

    impl Extension for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn call(&self, args: Vec<Value>) -> Result<Value, ActionError> {
            let text = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::InvalidArgument("expected a string".into()))?;
            Ok(Value::from(text.to_uppercase()))
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("user").is_none());

        store.set("user", json!({"id": 7}));
        assert!(store.contains("user"));
        assert_eq!(store.get("user"), Some(json!({"id": 7})));

        assert_eq!(store.remove("user"), Some(json!({"id": 7})));
        assert!(store.is_empty());
    }

    #[test]
    fn test_extensions() {
        let mut extensions = Extensions::new();
        extensions.register(Shout);

        assert_eq!(extensions.names(), vec!["shout"]);
        let shout = extensions.get("shout").unwrap();
        assert_eq!(shout.call(vec![json!("hi")]).unwrap(), json!("HI"));
        assert!(shout.call(vec![]).is_err());
        assert!(extensions.get("missing").is_none());
    }
}
