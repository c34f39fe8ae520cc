//! Coin-operated vending dispenser.

mod catalog;
mod change;
mod controller;
mod sink;

pub use catalog::{Catalog, Product, VendingEvent, RETURN};
pub use change::{ChangeError, ChangeMaker, MAX_COIN_UNITS};
pub use controller::{Vending, VendingState};
pub use sink::{ConsoleSink, NullSink, RecordingSink, VendingEffect, VendingSink};

use crate::builder::{BuildError, StateMachineBuilder};
use crate::engine::StateMachine;

/// Register every vending state and start in `waiting`.
pub fn machine(vending: Vending) -> Result<StateMachine<Vending>, BuildError> {
    StateMachineBuilder::new(vending)
        .states(VendingState::ALL.iter().copied())
        .initial(VendingState::Waiting)
        .build()
}
