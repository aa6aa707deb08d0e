//! Controller dispatch and auxiliary resource loading.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::config::{AppConfig, FrameworkConfig};
use crate::dispatch::outcome::{DispatchOutcome, DispatchRequest, DEFAULT_METHOD};
use crate::maintenance::{AllowListStore, FileAllowList, MaintenanceGate};
use crate::observability::metrics;
use crate::resource::error::ResourceError;
use crate::resource::factory::ResourceFactory;
use crate::resource::instance::Resource;
use crate::resource::kind::ResourceKind;
use crate::resource::locator::{FileProbe, Locate, ResolvedResource, ResourceLocator};
use crate::resource::path::{sanitize, ResourcePath};
use crate::resource::registry::ClassRegistry;
use crate::services::{Extensions, KeyValueStore, MemoryStore, Services};
use crate::upload::Upload;
use crate::view::{FileRenderer, TemplateRenderer, ViewGateway};

/// Post-construction hook run on every model.
pub const MODEL_INIT_METHOD: &str = "index";

/// Resolves paths to resources and invokes them.
///
/// Cheap to clone; every clone shares the same locator, registry, gate and
/// collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    app: AppConfig,
    locator: Arc<dyn Locate>,
    factory: ResourceFactory,
    gate: Arc<MaintenanceGate>,
    view: ViewGateway,
    session: Arc<dyn KeyValueStore>,
    cache: Arc<dyn KeyValueStore>,
    upload: Arc<Upload>,
    extensions: Arc<Extensions>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Dispatcher with the default collaborators for `config`.
    pub fn from_config(config: FrameworkConfig, registry: ClassRegistry) -> Self {
        Self::builder().config(config).registry(registry).build()
    }

    pub fn gate(&self) -> &Arc<MaintenanceGate> {
        &self.inner.gate
    }

    pub fn view(&self) -> &ViewGateway {
        &self.inner.view
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.inner.app
    }

    /// Constructor arguments for a new resource.
    pub fn services(&self) -> Services {
        Services {
            loader: self.clone(),
            view: self.inner.view.clone(),
            session: self.inner.session.clone(),
            cache: self.inner.cache.clone(),
            upload: self.inner.upload.clone(),
            extensions: self.inner.extensions.clone(),
        }
    }

    /// Resolve `request.path` to a controller method and invoke it.
    ///
    /// The whole path is tried as a controller first; failing that, the last
    /// segment is taken as a method name on the parent path. Only one level of
    /// fallback is attempted.
    pub fn dispatch_controller(&self, request: &DispatchRequest) -> Result<DispatchOutcome, ResourceError> {
        let start = Instant::now();
        let result = self.resolve_and_invoke(request);

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "error",
        };
        metrics::record_dispatch(label, start);
        tracing::debug!(path = %request.path, client_ip = %request.client_ip, outcome = label, "Dispatched");

        result
    }

    fn resolve_and_invoke(&self, request: &DispatchRequest) -> Result<DispatchOutcome, ResourceError> {
        let path = sanitize(&request.path)?;

        if !self.inner.gate.is_allowed(&request.client_ip) {
            tracing::info!(client_ip = %request.client_ip, path = %path, "Request blocked by maintenance mode");
            metrics::record_maintenance_blocked();
            return Ok(DispatchOutcome::MaintenanceBlocked);
        }

        let services = self.services();

        if let Some((resolved, mut controller)) = self.instantiate(ResourceKind::Controller, &path, &services)? {
            let method = request.method.as_deref().unwrap_or(DEFAULT_METHOD);
            return invoke(&resolved, controller.as_mut(), method, request.args.clone());
        }

        let Some((parent, method)) = path.split_last() else {
            return Ok(DispatchOutcome::NotFound);
        };

        match self.instantiate(ResourceKind::Controller, &parent, &services)? {
            Some((resolved, mut controller)) => invoke(&resolved, controller.as_mut(), method, request.args.clone()),
            None => Ok(DispatchOutcome::NotFound),
        }
    }

    /// Locate and construct; an absent resource yields `None`.
    fn instantiate(
        &self,
        kind: ResourceKind,
        path: &ResourcePath,
        services: &Services,
    ) -> Result<Option<(ResolvedResource, Box<dyn Resource>)>, ResourceError> {
        let resolved = self.inner.locator.locate(kind, path)?;
        match self.inner.factory.create(&resolved, services) {
            Ok(instance) => Ok(Some((resolved, instance))),
            Err(ResourceError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load a model, library or controller by path.
    ///
    /// Models have their `index` hook run exactly once before they are
    /// returned. Nothing is invoked on controllers or libraries.
    pub fn dispatch_auxiliary(&self, kind: ResourceKind, raw_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        let path = sanitize(raw_path)?;
        let resolved = self.inner.locator.locate(kind, &path)?;
        if !resolved.exists {
            tracing::warn!(kind = %kind, path = %path, "The {} '{}' doesn't exist", kind, path);
        }

        let mut instance = self.inner.factory.create(&resolved, &self.services())?;

        if kind == ResourceKind::Model && resolved.has_method(MODEL_INIT_METHOD) {
            instance
                .call(MODEL_INIT_METHOD, Vec::new())
                .map_err(|source| ResourceError::Action {
                    class: resolved.class_name.clone(),
                    method: MODEL_INIT_METHOD.to_string(),
                    source,
                })?;
        }

        Ok(instance)
    }

    pub fn model(&self, raw_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        self.dispatch_auxiliary(ResourceKind::Model, raw_path)
    }

    pub fn library(&self, raw_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        self.dispatch_auxiliary(ResourceKind::Library, raw_path)
    }

    /// Construct a controller without invoking anything.
    pub fn controller(&self, raw_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        self.dispatch_auxiliary(ResourceKind::Controller, raw_path)
    }

    /// Invoke `method` on the controller at `raw_path`, no fallback.
    pub fn call(&self, raw_path: &str, method: &str, args: Vec<Value>) -> Result<Value, ResourceError> {
        let path = sanitize(raw_path)?;
        let resolved = self.inner.locator.locate(ResourceKind::Controller, &path)?;
        let mut controller = self.inner.factory.create(&resolved, &self.services())?;

        match invoke(&resolved, controller.as_mut(), method, args)? {
            DispatchOutcome::Invoked { value } => Ok(value),
            _ => Err(ResourceError::MethodNotFound {
                kind: ResourceKind::Controller,
                path: path.to_string(),
                method: method.to_string(),
            }),
        }
    }

    pub fn controller_exists(&self, raw_path: &str) -> bool {
        sanitize(raw_path)
            .ok()
            .and_then(|path| self.inner.locator.locate(ResourceKind::Controller, &path).ok())
            .is_some_and(|resolved| resolved.exists)
    }

    /// Whether the controller exists and declares `method`.
    ///
    /// Read from the registered method table; the controller is not built.
    pub fn has_method(&self, raw_path: &str, method: &str) -> bool {
        sanitize(raw_path)
            .ok()
            .and_then(|path| self.inner.locator.locate(ResourceKind::Controller, &path).ok())
            .is_some_and(|resolved| resolved.exists && resolved.has_method(method))
    }

    /// Expected source file of the controller at `raw_path`.
    pub fn controller_file(&self, raw_path: &str) -> Result<PathBuf, ResourceError> {
        let path = sanitize(raw_path)?;
        Ok(self.inner.locator.locate(ResourceKind::Controller, &path)?.file)
    }

    /// Run the configured not-found controller, if there is one.
    pub fn not_found(&self) -> Option<Value> {
        let path = &self.inner.app.not_found_controller;
        match self.call(path, DEFAULT_METHOD, Vec::new()) {
            Ok(value) => Some(value),
            Err(ResourceError::NotFound { .. }) => None,
            Err(e) => {
                tracing::error!(controller = %path, error = %e, "Not-found controller failed");
                None
            }
        }
    }

    /// Load `{app_dir}/language/{language}/{path}.json`.
    ///
    /// Missing or malformed files are logged and yield `None`.
    pub fn language(&self, raw_path: &str, language: Option<&str>) -> Option<Map<String, Value>> {
        let language = language.unwrap_or(self.inner.app.default_language.as_str());
        let (path, language) = match (sanitize(raw_path), sanitize(language)) {
            (Ok(path), Ok(language)) => (path, language),
            _ => {
                tracing::warn!(path = %raw_path, language, "Invalid language path");
                return None;
            }
        };

        let mut file = self.inner.app.app_dir.join("language").join(language.as_str());
        for segment in path.segments() {
            file.push(segment);
        }
        file.set_extension("json");

        let content = match std::fs::read_to_string(&file) {
            Ok(content) => content,
            Err(_) => {
                tracing::warn!(language = %language, path = %path, "The {} language for '{}' doesn't exist", language, path);
                return None;
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Malformed language file");
                None
            }
        }
    }
}

fn invoke(
    resolved: &ResolvedResource,
    instance: &mut dyn Resource,
    method: &str,
    args: Vec<Value>,
) -> Result<DispatchOutcome, ResourceError> {
    if !resolved.has_method(method) {
        tracing::debug!(class = %resolved.class_name, method, "Method not found");
        return Ok(DispatchOutcome::MethodNotFound {
            controller: resolved.path.to_string(),
            method: method.to_string(),
        });
    }

    instance
        .call(method, args)
        .map(DispatchOutcome::invoked)
        .map_err(|source| ResourceError::Action {
            class: resolved.class_name.clone(),
            method: method.to_string(),
            source,
        })
}

/// Assembles a [`Dispatcher`]; every part not given falls back to the
/// default for the configuration.
#[derive(Default)]
pub struct DispatcherBuilder {
    config: FrameworkConfig,
    registry: Option<ClassRegistry>,
    locator: Option<Arc<dyn Locate>>,
    probe: Option<Arc<dyn FileProbe>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    allow_list: Option<Arc<dyn AllowListStore>>,
    session: Option<Arc<dyn KeyValueStore>>,
    cache: Option<Arc<dyn KeyValueStore>>,
    upload: Option<Upload>,
    extensions: Extensions,
}

impl DispatcherBuilder {
    pub fn config(mut self, config: FrameworkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: ClassRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the locator entirely (the probe setting is then unused).
    pub fn locator(mut self, locator: Arc<dyn Locate>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// File probe of the default locator.
    pub fn probe(mut self, probe: impl FileProbe + 'static) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn allow_list(mut self, store: impl AllowListStore + 'static) -> Self {
        self.allow_list = Some(Arc::new(store));
        self
    }

    pub fn session(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session = Some(Arc::new(store));
        self
    }

    pub fn cache(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.cache = Some(Arc::new(store));
        self
    }

    pub fn upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn build(self) -> Dispatcher {
        let config = self.config;
        let registry = Arc::new(
            self.registry
                .unwrap_or_else(|| ClassRegistry::new(config.namespaces.clone())),
        );

        let locator = match self.locator {
            Some(locator) => locator,
            None => {
                let mut locator = ResourceLocator::new(&config.app, registry.clone());
                if let Some(probe) = self.probe {
                    locator = locator.with_shared_probe(probe);
                }
                Arc::new(locator)
            }
        };

        let store = self
            .allow_list
            .unwrap_or_else(|| Arc::new(FileAllowList::new(&config.maintenance.whitelist_path)));
        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(FileRenderer::new(&config.views)));

        tracing::debug!(classes = registry.len(), maintenance = config.maintenance.enabled, "Dispatcher built");

        Dispatcher {
            inner: Arc::new(Inner {
                locator,
                factory: ResourceFactory::new(registry),
                gate: Arc::new(MaintenanceGate::new(store, config.maintenance.enabled)),
                view: ViewGateway::new(renderer, config.views.cache_enabled),
                session: self.session.unwrap_or_else(|| Arc::new(MemoryStore::new())),
                cache: self.cache.unwrap_or_else(|| Arc::new(MemoryStore::new())),
                upload: Arc::new(self.upload.unwrap_or_else(|| Upload::from_config(&config.upload))),
                extensions: Arc::new(self.extensions),
                app: config.app,
            }),
        }
    }
}
