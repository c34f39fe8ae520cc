//! Dispenser: event-driven controllers on a small finite state machine core
//!
//! Two controllers share one engine: a coin-operated vending dispenser and a
//! water bottle filling station. An external driver stores at most one event
//! on the machine and calls `update`; the current state's hook decides
//! whether to transition, and entry/exit hooks perform the side effects.
//!
//! # Core Concepts
//!
//! - **State**: closed enums implementing the `State` trait
//! - **Controller**: domain data plus per-state entry/exit/update hooks
//! - **StateMachine**: state registry, pending event slot and transition logic
//! - **Sinks**: injected outputs (dispenser, coin return, valve)
//!
//! # Example
//!
//! ```rust
//! use dispenser::vending::{self, Catalog, RecordingSink, Vending, VendingEvent, VendingState};
//!
//! let sink = RecordingSink::new();
//! let controller = Vending::new(Catalog::canadian(), sink.clone()).unwrap();
//! let mut machine = vending::machine(controller).unwrap();
//!
//! machine.dispatch(VendingEvent::Coin("$2".to_string())).unwrap();
//! machine.dispatch(VendingEvent::Product("Cola".to_string())).unwrap();
//! assert_eq!(machine.current_state(), Some(&VendingState::CountChange));
//!
//! machine.tick().unwrap();
//! assert_eq!(machine.current_state(), Some(&VendingState::Waiting));
//! assert_eq!(sink.returned_coins(), vec![25, 25]);
//! ```

pub mod builder;
pub mod config;
pub mod cooler;
pub mod core;
pub mod engine;
pub mod vending;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use crate::core::{Clock, Event, ManualClock, State, StateHistory, StateTransition, SystemClock};
pub use engine::{Controller, MachineError, StateMachine, Tick};
