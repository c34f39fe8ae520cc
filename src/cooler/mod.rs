//! Water bottle filling station.

mod controller;
mod sink;

pub use controller::{CoolerEvent, CoolerState, WaterCooler, DEFAULT_FILL_TIMEOUT};
pub use sink::{ConsoleValve, NullValve, RecordingValve, ValveCommand, ValveSink};

use crate::builder::{BuildError, StateMachineBuilder};
use crate::core::Clock;
use crate::engine::StateMachine;

/// Register every filling station state and start in `waiting`.
pub fn machine(
    cooler: WaterCooler,
    clock: impl Clock + 'static,
) -> Result<StateMachine<WaterCooler>, BuildError> {
    StateMachineBuilder::new(cooler)
        .states(CoolerState::ALL.iter().copied())
        .initial(CoolerState::Waiting)
        .clock(clock)
        .build()
}
