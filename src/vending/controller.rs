//! Coin-operated vending controller.
//!
//! ```text
//! [waiting]         -- coin / add value -------------------> [add_coins]
//! [add_coins]       -- coin / add value -------------------> [add_coins]
//! [add_coins]       -- product, enough credit -------------> [deliver_product]
//! [add_coins]       -- RETURN / refund all ----------------> [count_change]
//! [deliver_product] -- (on entry) dispense, change owed ---> [count_change]
//! [deliver_product] -- (on entry) dispense, exact ---------> [waiting]
//! [count_change]    -- return coins ----------------------> [waiting]
//! ```

use super::catalog::{Catalog, VendingEvent};
use super::change::{ChangeError, ChangeMaker};
use super::sink::VendingSink;
use crate::engine::{Controller, Tick};
use crate::state_enum;
use tracing::{debug, error, info, warn};

state_enum! {
    /// States of the vending controller.
    pub enum VendingState {
        Waiting => "waiting",
        AddCoins => "add_coins",
        DeliverProduct => "deliver_product",
        CountChange => "count_change",
    }
}

/// Vending machine context: catalog, credit, change owed and output sink.
pub struct Vending {
    catalog: Catalog,
    change: ChangeMaker,
    amount: u32,
    change_due: u32,
    selected: Option<String>,
    sink: Box<dyn VendingSink>,
}

impl Vending {
    /// Build a controller selling from `catalog`, sending effects to `sink`.
    ///
    /// Fails when the catalog has no usable coin denominations.
    pub fn new(catalog: Catalog, sink: impl VendingSink + 'static) -> Result<Self, ChangeError> {
        let change = ChangeMaker::new(catalog.denominations())?;
        if !change.is_canonical() {
            warn!(
                denominations = ?change.denominations(),
                "coin set is not canonical, change will be computed exactly"
            );
        }
        Ok(Self {
            catalog,
            change,
            amount: 0,
            change_due: 0,
            selected: None,
            sink: Box::new(sink),
        })
    }

    /// Credit inserted so far, in cents.
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Change still owed, in cents.
    pub fn change_due(&self) -> u32 {
        self.change_due
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Denominations used for change, largest first.
    pub fn coin_values(&self) -> &[u32] {
        self.change.denominations()
    }

    /// Text for the balance display.
    pub fn balance_message(&self) -> String {
        format!("Balance: ¢{}", self.amount)
    }

    /// Add the value of coin `id`. Returns false for unknown coins, or when
    /// the credit would overflow.
    fn add_coin(&mut self, id: &str) -> bool {
        let Some(value) = self.catalog.coin_value(id) else {
            return false;
        };
        match self.amount.checked_add(value) {
            Some(amount) => {
                self.amount = amount;
                info!(coin = id, amount, "coin accepted");
                true
            }
            None => {
                warn!(coin = id, amount = self.amount, "coin rejected, credit would overflow");
                false
            }
        }
    }

    fn waiting(&mut self, event: Option<&VendingEvent>) -> Option<VendingState> {
        match event {
            Some(VendingEvent::Coin(id)) if self.add_coin(id) => Some(VendingState::AddCoins),
            _ => None,
        }
    }

    fn add_coins(&mut self, event: Option<&VendingEvent>) -> Option<VendingState> {
        match event? {
            VendingEvent::Return => {
                self.change_due = self.amount;
                self.amount = 0;
                info!(refund = self.change_due, "refund requested");
                Some(VendingState::CountChange)
            }
            VendingEvent::Coin(id) => {
                self.add_coin(id);
                None
            }
            VendingEvent::Product(id) => {
                let product = self.catalog.product(id)?;
                if self.amount >= product.price {
                    self.selected = Some(product.id.clone());
                    Some(VendingState::DeliverProduct)
                } else {
                    debug!(
                        product = %product.id,
                        price = product.price,
                        amount = self.amount,
                        "insufficient credit"
                    );
                    None
                }
            }
        }
    }

    fn deliver_product(&mut self) -> Option<VendingState> {
        let product = self
            .selected
            .take()
            .and_then(|id| self.catalog.product(&id).cloned());

        let Some(product) = product else {
            warn!(amount = self.amount, "no product selected, refunding credit");
            self.change_due = self.amount;
            self.amount = 0;
            return Some(VendingState::CountChange);
        };

        debug_assert!(self.amount >= product.price, "credit below price at delivery");
        self.change_due = self.amount.saturating_sub(product.price);
        self.amount = 0;
        self.sink.dispense(&product);

        if self.change_due > 0 {
            Some(VendingState::CountChange)
        } else {
            Some(VendingState::Waiting)
        }
    }

    fn announce_change(&mut self) {
        let message = format!(
            "Change due: ${}.{:02}",
            self.change_due / 100,
            self.change_due % 100
        );
        self.sink.display(&message);
    }

    fn count_change(&mut self) -> Option<VendingState> {
        match self.change.make_change(self.change_due) {
            Ok(coins) => {
                for coin in coins {
                    self.sink.return_coin(coin);
                    self.change_due -= coin;
                }
                debug_assert_eq!(self.change_due, 0);
                Some(VendingState::Waiting)
            }
            Err(err) => {
                error!(change_due = self.change_due, %err, "cannot return change");
                None
            }
        }
    }
}

impl Controller for Vending {
    type State = VendingState;
    type Event = VendingEvent;

    fn on_entry(
        &mut self,
        state: VendingState,
        _tick: &Tick<'_, VendingEvent>,
    ) -> Option<VendingState> {
        match state {
            VendingState::DeliverProduct => self.deliver_product(),
            VendingState::CountChange => {
                self.announce_change();
                None
            }
            VendingState::Waiting | VendingState::AddCoins => None,
        }
    }

    fn update(
        &mut self,
        state: VendingState,
        tick: &Tick<'_, VendingEvent>,
    ) -> Option<VendingState> {
        match state {
            VendingState::Waiting => self.waiting(tick.event),
            VendingState::AddCoins => self.add_coins(tick.event),
            VendingState::DeliverProduct => None,
            VendingState::CountChange => self.count_change(),
        }
    }
}
