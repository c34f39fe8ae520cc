//! Semantic validation of a loaded configuration.
//!
//! Uses Stillwater's `Validation` so a bad file reports every problem in one
//! pass instead of one per run.

use super::{ConfigError, DispenserConfig};
use crate::vending::{ChangeError, ChangeMaker, MAX_COIN_UNITS, RETURN};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// One problem found in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("vending.products is empty")]
    NoProducts,

    #[error("vending.coins is empty")]
    NoCoins,

    #[error("product '{id}' has a zero price")]
    ZeroPrice { id: String },

    #[error("coin '{id}' has a zero value")]
    ZeroCoin { id: String },

    #[error("'{id}' is reserved for the refund button")]
    ReservedId { id: String },

    #[error("'{id}' is both a product and a coin")]
    AmbiguousId { id: String },

    #[error("coin '{id}' ({value}¢) is more than {MAX_COIN_UNITS} times the {unit}¢ unit")]
    CoinTooLarge { id: String, value: u32, unit: u32 },

    #[error("smallest coin ({smallest}¢) is not the {unit}¢ unit, some change could not be paid")]
    NoUnitCoin { smallest: u32, unit: u32 },

    #[error("product '{id}' price {price}¢ is not a multiple of the {unit}¢ coin unit")]
    PriceOffUnit { id: String, price: u32, unit: u32 },

    #[error("cooler.fill_timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("history_limit must be greater than zero")]
    ZeroHistoryLimit,
}

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn require(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

impl DispenserConfig {
    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Check {
        let vending = &self.vending;
        let mut checks: Vec<Check> = vec![
            require(!vending.products.is_empty(), || ConfigViolation::NoProducts),
            require(!vending.coins.is_empty(), || ConfigViolation::NoCoins),
            require(self.cooler.fill_timeout_ms > 0, || ConfigViolation::ZeroTimeout),
            require(self.history_limit > 0, || ConfigViolation::ZeroHistoryLimit),
        ];

        for (id, product) in &vending.products {
            checks.push(require(product.price > 0, || ConfigViolation::ZeroPrice {
                id: id.clone(),
            }));
            checks.push(require(vending.coins.get(id).is_none(), || {
                ConfigViolation::AmbiguousId { id: id.clone() }
            }));
        }
        for (id, value) in &vending.coins {
            checks.push(require(*value > 0, || ConfigViolation::ZeroCoin {
                id: id.clone(),
            }));
        }
        for id in vending.products.keys().chain(vending.coins.keys()) {
            checks.push(require(!id.trim().eq_ignore_ascii_case(RETURN), || {
                ConfigViolation::ReservedId { id: id.clone() }
            }));
        }

        checks.extend(self.change_checks());

        Validation::all_vec(checks).map(|_| ())
    }

    /// Every credit minus any price must be payable in coins: the smallest
    /// coin has to be the coins' common unit and every price a multiple of it.
    fn change_checks(&self) -> Vec<Check> {
        let vending = &self.vending;
        let maker = match ChangeMaker::new(vending.coins.values().copied()) {
            Ok(maker) => maker,
            Err(ChangeError::CoinTooLarge { largest, unit }) => {
                return vending
                    .coins
                    .iter()
                    .filter(|(_, value)| **value == largest)
                    .map(|(id, value)| {
                        Validation::fail(ConfigViolation::CoinTooLarge {
                            id: id.clone(),
                            value: *value,
                            unit,
                        })
                    })
                    .collect();
            }
            // empty or zero coins are reported on their own
            Err(_) => return Vec::new(),
        };

        let unit = maker.unit();
        let smallest = maker.denominations().last().copied().unwrap_or(unit);
        let mut checks = vec![require(smallest == unit, || ConfigViolation::NoUnitCoin {
            smallest,
            unit,
        })];
        for (id, product) in &vending.products {
            checks.push(require(product.price % unit == 0, || {
                ConfigViolation::PriceOffUnit {
                    id: id.clone(),
                    price: product.price,
                    unit,
                }
            }));
        }
        checks
    }

    /// [`validate`](Self::validate) folded into a single [`ConfigError`].
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => {
                let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                Err(ConfigError::ValidationError(messages.join("; ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductConfig;

    fn violations(config: &DispenserConfig) -> Vec<ConfigViolation> {
        match config.validate() {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = DispenserConfig::default();
        assert!(config.validate().is_success());
        assert!(config.check().is_ok());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut config = DispenserConfig::default();
        config.vending.products.clear();
        config.vending.coins.clear();
        config.cooler.fill_timeout_ms = 0;
        config.history_limit = 0;

        let found = violations(&config);
        assert_eq!(found.len(), 4);
        assert!(found.contains(&ConfigViolation::NoProducts));
        assert!(found.contains(&ConfigViolation::NoCoins));
        assert!(found.contains(&ConfigViolation::ZeroTimeout));
        assert!(found.contains(&ConfigViolation::ZeroHistoryLimit));
    }

    #[test]
    fn per_entry_rules() {
        let mut config = DispenserConfig::default();
        config.vending.products.insert(
            "Free".to_string(),
            ProductConfig {
                name: None,
                price: 0,
            },
        );
        config.vending.products.insert(
            "$1".to_string(),
            ProductConfig {
                name: None,
                price: 100,
            },
        );
        config.vending.coins.insert("return".to_string(), 5);
        config.vending.coins.insert("slug".to_string(), 0);

        let found = violations(&config);
        assert!(found.contains(&ConfigViolation::ZeroPrice {
            id: "Free".to_string()
        }));
        assert!(found.contains(&ConfigViolation::AmbiguousId {
            id: "$1".to_string()
        }));
        assert!(found.contains(&ConfigViolation::ReservedId {
            id: "return".to_string()
        }));
        assert!(found.contains(&ConfigViolation::ZeroCoin {
            id: "slug".to_string()
        }));
    }

    #[test]
    fn oversized_coin_is_reported() {
        let mut config = DispenserConfig::default();
        config.vending.coins.insert("bill".to_string(), 2_000_000);

        assert_eq!(
            violations(&config),
            vec![ConfigViolation::CoinTooLarge {
                id: "bill".to_string(),
                value: 2_000_000,
                unit: 5
            }]
        );
    }

    #[test]
    fn price_off_the_coin_unit_is_reported() {
        let mut config = DispenserConfig::default();
        config.vending.products.insert(
            "Mint".to_string(),
            ProductConfig {
                name: None,
                price: 3,
            },
        );

        assert_eq!(
            violations(&config),
            vec![ConfigViolation::PriceOffUnit {
                id: "Mint".to_string(),
                price: 3,
                unit: 5
            }]
        );
        assert!(config.check().is_err());
    }

    #[test]
    fn coin_set_without_unit_coin_is_reported() {
        let mut config = DispenserConfig::default();
        config.vending.coins.clear();
        config.vending.coins.insert("six".to_string(), 6);
        config.vending.coins.insert("ten".to_string(), 10);
        for product in config.vending.products.values_mut() {
            product.price = 20;
        }

        assert_eq!(
            violations(&config),
            vec![ConfigViolation::NoUnitCoin {
                smallest: 6,
                unit: 2
            }]
        );
    }

    #[test]
    fn check_joins_messages() {
        let mut config = DispenserConfig::default();
        config.cooler.fill_timeout_ms = 0;
        config.history_limit = 0;

        let err = config.check().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fill_timeout_ms"));
        assert!(message.contains("history_limit"));
    }
}
