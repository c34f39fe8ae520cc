//! Build errors for the state machine builder.

use crate::engine::MachineError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No states registered. Call .state(s) or .states(iter) before .build()")]
    NoStates,

    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("State '{name}' registered twice")]
    DuplicateState { name: String },

    #[error("Initial state '{name}' is not among the registered states")]
    InitialNotRegistered { name: String },

    #[error("Entering the initial state failed: {0}")]
    Machine(#[from] MachineError),
}
