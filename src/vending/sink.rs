//! Where the vending controller's side effects go.

use super::catalog::Product;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Physical or simulated outputs of a vending machine.
pub trait VendingSink: Send {
    fn dispense(&mut self, product: &Product);
    fn return_coin(&mut self, value: u32);
    fn display(&mut self, message: &str);
}

impl<T: VendingSink + ?Sized> VendingSink for Box<T> {
    fn dispense(&mut self, product: &Product) {
        (**self).dispense(product);
    }

    fn return_coin(&mut self, value: u32) {
        (**self).return_coin(value);
    }

    fn display(&mut self, message: &str) {
        (**self).display(message);
    }
}

/// Prints to stdout, the way the console simulator shows its outputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl VendingSink for ConsoleSink {
    fn dispense(&mut self, product: &Product) {
        info!(product = %product.id, "dispensing");
        println!("Buzz... Whir... Click... {}", product.name);
    }

    fn return_coin(&mut self, value: u32) {
        info!(value, "returning coin");
        println!("Returning {value}");
    }

    fn display(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Discards every effect.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl VendingSink for NullSink {
    fn dispense(&mut self, _product: &Product) {}
    fn return_coin(&mut self, _value: u32) {}
    fn display(&mut self, _message: &str) {}
}

/// One observed side effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VendingEffect {
    Dispensed(String),
    CoinReturned(u32),
    Displayed(String),
}

/// Records effects for later inspection. Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    effects: Arc<Mutex<Vec<VendingEffect>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn effects(&self) -> Vec<VendingEffect> {
        self.lock().clone()
    }

    /// Values of the coins returned so far, in order.
    pub fn returned_coins(&self) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|effect| match effect {
                VendingEffect::CoinReturned(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Ids of the products dispensed so far, in order.
    pub fn dispensed(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|effect| match effect {
                VendingEffect::Dispensed(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, effect: VendingEffect) {
        self.lock().push(effect);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<VendingEffect>> {
        self.effects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VendingSink for RecordingSink {
    fn dispense(&mut self, product: &Product) {
        self.push(VendingEffect::Dispensed(product.id.clone()));
    }

    fn return_coin(&mut self, value: u32) {
        self.push(VendingEffect::CoinReturned(value));
    }

    fn display(&mut self, message: &str) {
        self.push(VendingEffect::Displayed(message.to_string()));
    }
}
