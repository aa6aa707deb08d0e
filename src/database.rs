//! Database connection factory.
//!
//! Drivers are out of scope; a [`Connector`] turns a DSN plus credentials
//! into whatever connection type the application uses.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::util::interpolate;

const DSN_FORMAT: &str = "{dbms}:host={server}; dbname={db}";

/// Driver-level connection failure.
#[derive(Debug, Error)]
#[error("connection failed: {0}")]
pub struct ConnectError(pub String);

/// Driver options, e.g. `("timeout", "5")`.
pub type ConnectOptions = BTreeMap<String, String>;

/// Opens connections for a driver.
pub trait Connector {
    type Connection;

    fn connect(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
        options: &ConnectOptions,
    ) -> Result<Self::Connection, ConnectError>;
}

/// Build the DSN for `config`.
pub fn dsn(config: &DatabaseConfig) -> String {
    let mut values = Map::new();
    values.insert("dbms".into(), Value::from(config.dbms.as_str()));
    values.insert("server".into(), Value::from(config.server.as_str()));
    values.insert("db".into(), Value::from(config.name.as_str()));
    interpolate(DSN_FORMAT, &values)
}

/// Open a connection, or `None` when no database is configured, no options
/// were given, or the driver failed (the failure is logged).
pub fn connection<C: Connector>(
    config: &DatabaseConfig,
    connector: &C,
    options: &ConnectOptions,
) -> Option<C::Connection> {
    if options.is_empty() || config.name.is_empty() {
        return None;
    }

    let dsn = dsn(config);
    match connector.connect(&dsn, &config.username, &config.password, options) {
        Ok(connection) => {
            tracing::debug!(dbms = %config.dbms, server = %config.server, db = %config.name, "Database connected");
            Some(connection)
        }
        Err(e) => {
            tracing::error!(dbms = %config.dbms, server = %config.server, error = %e, "Database connection failed");
            None
        }
    }
}
