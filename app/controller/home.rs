use frontdesk::resource::{ActionError, Resource, Value};
use frontdesk::services::Services;
use serde_json::json;

pub struct Home {
    services: Services,
}

impl Home {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn index(&self) -> Result<Value, ActionError> {
        let mut data = self.services.loader.language("home", None).unwrap_or_default();
        data.entry("title").or_insert_with(|| json!("Welcome"));
        data.entry("message").or_insert_with(|| json!("It works."));

        Ok(Value::String(self.services.view.view("home", &data)?))
    }

    fn about(&self) -> Result<Value, ActionError> {
        Ok(json!({
            "name": "frontdesk",
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }
}

impl Resource for Home {
    fn methods() -> &'static [&'static str] {
        &["index", "about"]
    }

    fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, ActionError> {
        match method {
            "index" => self.index(),
            "about" => self.about(),
            other => Err(ActionError::UnknownMethod(other.to_string())),
        }
    }
}
