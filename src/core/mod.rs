//! Core state machine types.
//!
//! This module contains the pieces every controller shares:
//! - State and event identities via the `State` and `Event` traits
//! - The injected monotonic `Clock`
//! - Bounded transition history

mod clock;
mod history;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::{Event, State};
