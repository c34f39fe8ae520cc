//! Product and coin tables, and the vending input alphabet.

use crate::core::Event;
use crate::engine::MachineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label of the refund button.
pub const RETURN: &str = "RETURN";

/// Input events understood by the vending controller.
///
/// Coins and products are identified by their catalog id (the label on the
/// slot or button). A `Coin` or `Product` whose id is missing from the
/// catalog is ignored by every state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendingEvent {
    Coin(String),
    Product(String),
    Return,
}

impl Event for VendingEvent {
    fn name(&self) -> &str {
        match self {
            Self::Coin(id) | Self::Product(id) => id,
            Self::Return => RETURN,
        }
    }
}

/// A product on sale, priced in cents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: u32,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Products and accepted coins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
    coins: BTreeMap<String, u32>,
}

impl Catalog {
    pub fn new(
        products: impl IntoIterator<Item = Product>,
        coins: impl IntoIterator<Item = (String, u32)>,
    ) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            coins: coins.into_iter().collect(),
        }
    }

    /// Canadian coins (nickel to toonie) and the stock product line-up.
    pub fn canadian() -> Self {
        Self::new(
            [
                Product::new("Chocolate", "Chocolate", 200),
                Product::new("Cola", "Cola", 150),
                Product::new("Milk", "Milk", 200),
                Product::new("Choc Milk", "Choc Milk", 225),
                Product::new("Gum", "Gum", 125),
            ],
            [
                ("¢5".to_string(), 5),
                ("¢10".to_string(), 10),
                ("¢25".to_string(), 25),
                ("$1".to_string(), 100),
                ("$2".to_string(), 200),
            ],
        )
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn coin_value(&self, id: &str) -> Option<u32> {
        self.coins.get(id).copied()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn coins(&self) -> impl Iterator<Item = (&str, u32)> {
        self.coins.iter().map(|(id, value)| (id.as_str(), *value))
    }

    /// Distinct coin values, largest first.
    pub fn denominations(&self) -> Vec<u32> {
        let mut values: Vec<u32> = self.coins.values().copied().collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.dedup();
        values
    }

    /// Map a button or slot label onto an event.
    ///
    /// Coin ids win over product ids; configuration validation rejects
    /// catalogs where the two overlap.
    pub fn parse_event(&self, label: &str) -> Result<VendingEvent, MachineError> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(RETURN) {
            Ok(VendingEvent::Return)
        } else if self.coins.contains_key(label) {
            Ok(VendingEvent::Coin(label.to_string()))
        } else if self.products.contains_key(label) {
            Ok(VendingEvent::Product(label.to_string()))
        } else {
            Err(MachineError::UnrecognizedEvent {
                label: label.to_string(),
            })
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::canadian()
    }
}
