//! View rendering gateway.
//!
//! Controllers render through [`ViewGateway`]; the gateway sanitizes the view
//! path and forwards everything else untouched to a [`TemplateRenderer`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ViewConfig;
use crate::resource::path::{sanitize, PathError};
use crate::util::interpolate;

/// View data passed through to the renderer.
pub type ViewData = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("invalid view path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("view '{0}' not found")]
    NotFound(String),

    #[error("failed to read view '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The template engine contract.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, path: &str, data: &ViewData, use_cache: bool) -> Result<String, ViewError>;
}

/// Thin adapter used by the dispatcher and by controllers.
#[derive(Clone)]
pub struct ViewGateway {
    renderer: Arc<dyn TemplateRenderer>,
    cache_enabled: bool,
}

impl ViewGateway {
    pub fn new(renderer: Arc<dyn TemplateRenderer>, cache_enabled: bool) -> Self {
        Self {
            renderer,
            cache_enabled,
        }
    }

    /// Render `path` with `data`.
    pub fn render(&self, path: &str, data: &ViewData, use_cache: bool) -> Result<String, ViewError> {
        let path = sanitize(path)?;
        self.renderer
            .render(path.as_str(), data, use_cache && self.cache_enabled)
    }

    /// Render with the template cache.
    pub fn view(&self, path: &str, data: &ViewData) -> Result<String, ViewError> {
        self.render(path, data, true)
    }

    /// Render bypassing the template cache.
    pub fn get_view(&self, path: &str, data: &ViewData) -> Result<String, ViewError> {
        self.render(path, data, false)
    }
}

impl fmt::Debug for ViewGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewGateway")
            .field("cache_enabled", &self.cache_enabled)
            .finish_non_exhaustive()
    }
}

/// Renders `{directory}/{path}.{extension}` with `{key}` substitution.
#[derive(Debug)]
pub struct FileRenderer {
    directory: PathBuf,
    extension: String,
    cache: DashMap<String, Arc<str>>,
}

impl FileRenderer {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            extension: config.extension.clone(),
            cache: DashMap::new(),
        }
    }

    /// Number of cached templates.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn load(&self, path: &str) -> Result<Arc<str>, ViewError> {
        let mut file = self.directory.join(path);
        file.set_extension(&self.extension);

        match std::fs::read_to_string(&file) {
            Ok(source) => Ok(Arc::from(source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ViewError::NotFound(path.to_string())),
            Err(source) => Err(ViewError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

impl TemplateRenderer for FileRenderer {
    fn render(&self, path: &str, data: &ViewData, use_cache: bool) -> Result<String, ViewError> {
        let source = if use_cache {
            match self.cache.get(path) {
                Some(hit) => hit.value().clone(),
                None => {
                    let source = self.load(path)?;
                    self.cache.insert(path.to_string(), source.clone());
                    source
                }
            }
        } else {
            self.load(path)?
        };

        Ok(interpolate(&source, data))
    }
}
