use frontdesk::resource::{ActionError, Resource, Value};
use frontdesk::services::Services;
use frontdesk::view::{ViewData, ViewGateway};

/// Rendered by the front controller for unknown paths.
pub struct NotFound {
    view: ViewGateway,
}

impl NotFound {
    pub fn new(services: &Services) -> Self {
        Self {
            view: services.view.clone(),
        }
    }
}

impl Resource for NotFound {
    fn methods() -> &'static [&'static str] {
        &["index"]
    }

    fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
        match method {
            "index" => Ok(Value::String(self.view.get_view("_404", &ViewData::new())?)),
            other => Err(ActionError::UnknownMethod(other.to_string())),
        }
    }
}
