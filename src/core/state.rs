//! State and event traits shared by every controller.
//!
//! States are closed enums: the set of states a controller can be in is known
//! at compile time, so dispatch is a `match` rather than a trait object.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure. A state is a plain value naming the controller's
/// position; behaviour lives on the [`Controller`](crate::engine::Controller).
///
/// # Required Traits
///
/// - `Copy`: states are moved in and out of the registry and history freely
/// - `PartialEq`: transitions compare states
/// - `Debug`: diagnostics
/// - `Serialize` + `Deserialize`: history export
///
/// # Example
///
/// ```rust
/// use dispenser::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "open",
///             Self::Closed => "closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "open");
/// ```
pub trait State:
    Clone + Copy + PartialEq + Eq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Unique name of the state within its machine.
    ///
    /// The engine registers and looks states up by this name.
    fn name(&self) -> &str;
}

/// Trait for the input alphabet of a machine.
///
/// Events carry no payload beyond their identity. The absence of an event is
/// modelled as `Option::None` by the engine and never as a special variant.
pub trait Event: Clone + PartialEq + Debug + Send + Sync {
    /// Label used in logs and in the transition history.
    fn name(&self) -> &str;
}
