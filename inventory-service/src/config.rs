use std::collections::HashMap;

use db::DbConfig;
use thiserror::Error;

/// Logical name of the connection string used when none is chosen.
pub const DEFAULT_CONNECTION_NAME: &str = "DefaultConnection";

const CONNECTION_STRING_PREFIX: &str = "CONNECTION_STRING_";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No connection string configured for '{0}' (set CONNECTION_STRING_{1})")]
    MissingConnectionString(String, String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Inventory tracker configuration
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Connection strings keyed by upper-cased logical name
    connection_strings: HashMap<String, String>,

    /// Logical name of the connection to use
    pub connection_name: String,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Extra key material mixed into credential hashes
    pub credential_pepper: Option<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            connection_strings: HashMap::new(),
            connection_name: DEFAULT_CONNECTION_NAME.to_string(),
            connect_timeout_secs: 30,
            credential_pepper: None,
        }
    }
}

impl InventoryConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Create configuration from `(name, value)` pairs.
    ///
    /// Recognized: `CONNECTION_STRING_<NAME>`, `CONNECTION_NAME`,
    /// `CONNECT_TIMEOUT_SECS` and `CREDENTIAL_PEPPER`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let key = key.as_ref();
            if let Some(name) = key.strip_prefix(CONNECTION_STRING_PREFIX) {
                config
                    .connection_strings
                    .insert(name.to_ascii_uppercase(), value.into());
                continue;
            }

            match key {
                "CONNECTION_NAME" => config.connection_name = value.into(),
                "CONNECT_TIMEOUT_SECS" => {
                    let value: String = value.into();
                    config.connect_timeout_secs =
                        value.parse().map_err(|_| ConfigError::InvalidValue {
                            name: key.to_string(),
                            value: value.clone(),
                        })?;
                }
                "CREDENTIAL_PEPPER" => config.credential_pepper = Some(value.into()),
                _ => {}
            }
        }

        Ok(config)
    }

    /// Register a connection string under a logical name.
    pub fn with_connection_string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.connection_strings
            .insert(name.to_ascii_uppercase(), value.into());
        self
    }

    /// Connection string for a logical name
    pub fn connection_string(&self, name: &str) -> Option<&str> {
        self.connection_strings
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Database configuration for the selected connection
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let connection_string = self
            .connection_string(&self.connection_name)
            .ok_or_else(|| {
                ConfigError::MissingConnectionString(
                    self.connection_name.clone(),
                    self.connection_name.to_ascii_uppercase(),
                )
            })?;

        Ok(DbConfig::new(connection_string).with_connect_timeout(self.connect_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();
        assert_eq!(config.connection_name, "DefaultConnection");
        assert_eq!(config.connect_timeout_secs, 30);
        assert!(config.credential_pepper.is_none());
    }

    #[test]
    fn test_from_vars() {
        let config = InventoryConfig::from_vars([
            ("CONNECTION_STRING_DEFAULTCONNECTION", "mysql://app@db/inventory"),
            ("CONNECTION_STRING_REPORTING", "mysql://ro@replica/inventory"),
            ("CONNECT_TIMEOUT_SECS", "5"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();

        assert_eq!(
            config.connection_string("DefaultConnection"),
            Some("mysql://app@db/inventory")
        );
        assert_eq!(
            config.connection_string("Reporting"),
            Some("mysql://ro@replica/inventory")
        );

        let db = config.db_config().unwrap();
        assert_eq!(db.connection_string, "mysql://app@db/inventory");
        assert_eq!(db.connect_timeout_secs, 5);
    }

    #[test]
    fn test_selected_connection_name() {
        let config = InventoryConfig::from_vars([("CONNECTION_NAME", "Reporting")])
            .unwrap()
            .with_connection_string("Reporting", "mysql://ro@replica/inventory");

        assert_eq!(
            config.db_config().unwrap().connection_string,
            "mysql://ro@replica/inventory"
        );
    }

    #[test]
    fn test_missing_connection_string() {
        let config = InventoryConfig::default();
        assert_eq!(
            config.db_config().unwrap_err(),
            ConfigError::MissingConnectionString(
                "DefaultConnection".to_string(),
                "DEFAULTCONNECTION".to_string()
            )
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let err = InventoryConfig::from_vars([("CONNECT_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
