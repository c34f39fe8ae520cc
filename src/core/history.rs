//! State transition history tracking.
//!
//! Controllers run indefinitely, so the history is a bounded window of the
//! most recent transitions rather than a full log.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions kept by a [`StateHistory`].
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single state transition.
///
/// `from` is `None` for the very first entry into a machine, when there is no
/// state to exit yet.
///
/// # Example
///
/// ```rust
/// use dispenser::core::{State, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     On,
/// }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "off",
///             Self::On => "on",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Some(Lamp::Off),
///     to: Lamp::On,
///     trigger: Some("switch".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to.name(), "on");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being exited, if any
    pub from: Option<S>,
    /// The state being entered
    pub to: S,
    /// Name of the event pending when the transition happened
    pub trigger: Option<String>,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of state transitions.
///
/// Once `limit` records are held, recording a new one drops the oldest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    limit: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding at most [`DEFAULT_HISTORY_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history holding at most `limit` records (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Record a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.transitions.len() == self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition (when there
    /// is one), then the `to` state of each transition in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dispenser::core::{State, StateHistory, StateTransition};
    /// use serde::{Deserialize, Serialize};
    /// use chrono::Utc;
    ///
    /// #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
    /// enum Phase { One, Two }
    ///
    /// impl State for Phase {
    ///     fn name(&self) -> &str {
    ///         match self {
    ///             Self::One => "one",
    ///             Self::Two => "two",
    ///         }
    ///     }
    /// }
    ///
    /// let mut history = StateHistory::new();
    /// history.record(StateTransition { from: None, to: Phase::One, trigger: None, timestamp: Utc::now() });
    /// history.record(StateTransition { from: Some(Phase::One), to: Phase::Two, trigger: None, timestamp: Utc::now() });
    ///
    /// assert_eq!(history.get_path(), vec![&Phase::One, &Phase::Two]);
    /// ```
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(from) = self.transitions.front().and_then(|t| t.from.as_ref()) {
            path.push(from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration between the oldest and newest retained transitions.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Most recent transition.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Iterate retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
