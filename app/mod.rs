//! Welcome application shipped with the server binary.

pub mod controller;

use frontdesk::resource::{ClassRegistry, PathError, ResourceKind};

/// Register every class of the welcome application.
pub fn register(registry: &mut ClassRegistry) -> Result<(), PathError> {
    registry
        .register(ResourceKind::Controller, "home", controller::home::Home::new)?
        .register(ResourceKind::Controller, "_404", controller::_404::NotFound::new)?;
    Ok(())
}
