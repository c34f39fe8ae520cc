//! The imperative shell around the controllers.
//!
//! # Key Concepts
//!
//! - **Controller**: owns domain data and effect sinks, implements the
//!   entry/exit/update hooks for each state
//! - **State Machine**: holds the registry, current state and pending event,
//!   and carries out the transitions hooks request
//! - **Event Sources**: where blocking on input lives, outside the machine

mod machine;
mod source;
mod transition;

pub use machine::{StateMachine, MAX_ENTRY_CHAIN};
pub use source::{drive, ChannelSource, EventSource, Polled, ScriptedSource};
pub use transition::{Controller, MachineError, Tick};
