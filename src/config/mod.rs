//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock Canadian vending catalog and a five second fill timeout.
//!
//! ```toml
//! log_level = "debug"
//! history_limit = 128
//!
//! [vending.products.Gum]
//! price = 125
//!
//! [vending.products."Choc Milk"]
//! name = "Chocolate Milk"
//! price = 225
//!
//! [vending.coins]
//! "¢25" = 25
//! "$1" = 100
//!
//! [cooler]
//! fill_timeout_ms = 5000
//! ```

mod validate;

pub use validate::ConfigViolation;

use crate::core::DEFAULT_HISTORY_LIMIT;
use crate::vending::{Catalog, Product};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// A product entry; `name` defaults to the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub price: u32,
}

/// Product catalog and accepted coins, keyed by button/slot label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendingConfig {
    pub products: BTreeMap<String, ProductConfig>,
    pub coins: BTreeMap<String, u32>,
}

impl VendingConfig {
    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.products.iter().map(|(id, product)| {
                let name = product.name.clone().unwrap_or_else(|| id.clone());
                Product::new(id.clone(), name, product.price)
            }),
            self.coins.iter().map(|(id, value)| (id.clone(), *value)),
        )
    }
}

impl Default for VendingConfig {
    fn default() -> Self {
        let catalog = Catalog::canadian();
        Self {
            products: catalog
                .products()
                .map(|p| {
                    (
                        p.id.clone(),
                        ProductConfig {
                            name: (p.name != p.id).then(|| p.name.clone()),
                            price: p.price,
                        },
                    )
                })
                .collect(),
            coins: catalog
                .coins()
                .map(|(id, value)| (id.to_string(), value))
                .collect(),
        }
    }
}

/// Filling station settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolerConfig {
    pub fill_timeout_ms: u64,
}

impl CoolerConfig {
    pub fn fill_timeout(&self) -> Duration {
        Duration::from_millis(self.fill_timeout_ms)
    }
}

impl Default for CoolerConfig {
    fn default() -> Self {
        Self {
            fill_timeout_ms: 5_000,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenserConfig {
    pub log_level: LogLevel,
    /// Transitions kept in each machine's history.
    pub history_limit: usize,
    pub vending: VendingConfig,
    pub cooler: CoolerConfig,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            vending: VendingConfig::default(),
            cooler: CoolerConfig::default(),
        }
    }
}

impl DispenserConfig {
    /// Load `path` and validate it, reporting every violation at once.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.check()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_stock_machine() {
        let config = DispenserConfig::default();
        assert_eq!(config.vending.catalog(), Catalog::canadian());
        assert_eq!(config.cooler.fill_timeout(), Duration::from_secs(5));
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: DispenserConfig = toml::from_str("").unwrap();
        assert_eq!(config, DispenserConfig::default());
    }

    #[test]
    fn load_reads_tables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[vending.products.Gum]
price = 75

[vending.products.Tea]
name = "Green Tea"
price = 150

[vending.coins]
"¢25" = 25
"$1" = 100

[cooler]
fill_timeout_ms = 2500
"#
        )
        .unwrap();

        let config = DispenserConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.cooler.fill_timeout(), Duration::from_millis(2500));

        let catalog = config.vending.catalog();
        assert_eq!(catalog.product("Gum").map(|p| p.name.as_str()), Some("Gum"));
        assert_eq!(
            catalog.product("Tea").map(|p| p.name.as_str()),
            Some("Green Tea")
        );
        assert_eq!(catalog.denominations(), vec![100, 25]);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = DispenserConfig::load(Path::new("/nonexistent/dispenser.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = \"lots\"").unwrap();

        let result = DispenserConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn log_level_names() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::default().as_str(), "info");
    }
}
