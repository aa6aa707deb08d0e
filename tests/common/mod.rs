//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use frontdesk::config::{FrameworkConfig, NamespaceConfig};
use frontdesk::dispatch::DispatcherBuilder;
use frontdesk::maintenance::MemoryAllowList;
use frontdesk::resource::{
    ActionError, ClassRegistry, Locate, ResolvedResource, Resource, ResourceError, ResourceKind,
    ResourceLocator, ResourcePath,
};
use frontdesk::services::{MemoryStore, Services};
use frontdesk::Dispatcher;

/// Cache key the `inventory` model bumps from its `index` hook.
pub const MODEL_INDEX_CALLS: &str = "inventory.index.calls";

/// Cache key bumped every time the `blog` controller is constructed.
pub const BLOG_BUILDS: &str = "blog.builds";

fn bump(services: &Services, key: &str) {
    let count = services.cache.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
    services.cache.set(key, json!(count + 1));
}

pub struct Blog;

impl Resource for Blog {
    fn methods() -> &'static [&'static str] {
        &["index", "show", "fail"]
    }

    fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value, ActionError> {
        match method {
            "index" => Ok(json!("blog index")),
            "show" => Ok(json!({ "method": "show", "args": args })),
            "fail" => Err(ActionError::Failed("boom".into())),
            other => Err(ActionError::UnknownMethod(other.into())),
        }
    }
}

/// Nested controller `admin/users`.
pub struct Users;

impl Resource for Users {
    fn methods() -> &'static [&'static str] {
        &["index", "list"]
    }

    fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
        Ok(json!(format!("users {method}")))
    }
}

/// Model with an `index` hook.
pub struct Inventory {
    services: Services,
}

impl Resource for Inventory {
    fn methods() -> &'static [&'static str] {
        &["index", "count"]
    }

    fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
        let calls = self
            .services
            .cache
            .get(MODEL_INDEX_CALLS)
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        match method {
            "index" => {
                self.services.cache.set(MODEL_INDEX_CALLS, json!(calls + 1));
                Ok(Value::Null)
            }
            "count" => Ok(json!(calls)),
            other => Err(ActionError::UnknownMethod(other.into())),
        }
    }
}

/// Model without an `index` hook.
pub struct Plain;

impl Resource for Plain {
    fn methods() -> &'static [&'static str] {
        &["get"]
    }

    fn call(&mut self, _method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
        Ok(json!("plain"))
    }
}

pub struct Slug;

impl Resource for Slug {
    fn methods() -> &'static [&'static str] {
        &["slugify"]
    }

    fn call(&mut self, _method: &str, args: Vec<Value>) -> Result<Value, ActionError> {
        let text = args
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::InvalidArgument("expected a string".into()))?;
        Ok(json!(text.to_lowercase().replace(' ', "-")))
    }
}

pub fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new(NamespaceConfig::default());
    registry
        .register(ResourceKind::Controller, "blog", |services| {
            bump(services, BLOG_BUILDS);
            Blog
        })
        .unwrap()
        .register(ResourceKind::Controller, "admin/users", |_| Users)
        .unwrap()
        .register(ResourceKind::Model, "inventory", |services| Inventory {
            services: services.clone(),
        })
        .unwrap()
        .register(ResourceKind::Model, "plain", |_| Plain)
        .unwrap()
        .register(ResourceKind::Library, "text/slug", |_| Slug)
        .unwrap()
        .register(ResourceKind::Library, "library", |_| Slug)
        .unwrap()
        .register(ResourceKind::Library, "vendor/library", |_| Slug)
        .unwrap();
    registry
}

/// Every file-backed resource is treated as present on disk.
pub fn builder() -> DispatcherBuilder {
    Dispatcher::builder()
        .config(FrameworkConfig::default())
        .registry(registry())
        .probe(|_: &Path| true)
        .allow_list(MemoryAllowList::new())
        .cache(MemoryStore::new())
}

pub fn dispatcher() -> Dispatcher {
    builder().build()
}

/// Locator double that counts resolution attempts.
pub struct CountingLocator {
    inner: ResourceLocator,
    pub calls: AtomicUsize,
}

impl CountingLocator {
    pub fn new() -> Arc<Self> {
        let locator = ResourceLocator::new(&FrameworkConfig::default().app, Arc::new(registry()))
            .with_probe(|_: &Path| true);
        Arc::new(Self {
            inner: locator,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Locate for CountingLocator {
    fn locate(&self, kind: ResourceKind, path: &ResourcePath) -> Result<ResolvedResource, ResourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.locate(kind, path)
    }
}
