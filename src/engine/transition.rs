//! Controller hooks and transition errors.

use crate::core::{Event, State};
use std::time::Instant;

/// What a hook sees on each invocation.
///
/// `event` is the event pending for this update, `None` when the driver had
/// nothing to report. `now` is the single clock sample taken for the update,
/// so every hook run during one update agrees on the time.
#[derive(Clone, Copy, Debug)]
pub struct Tick<'a, E> {
    pub event: Option<&'a E>,
    pub now: Instant,
}

impl<'a, E> Tick<'a, E> {
    pub fn new(event: Option<&'a E>, now: Instant) -> Self {
        Self { event, now }
    }
}

/// Domain context plus per-state behaviour for one machine.
///
/// The implementor owns the machine's domain data (amounts, deadlines) and
/// its effect sinks. Each hook receives the state it is being run for and may
/// return a transition request; the [`StateMachine`](super::StateMachine)
/// carries the request out after the hook returns.
pub trait Controller {
    type State: State;
    type Event: Event;

    /// Runs after `state` becomes current. Returning a state chains another
    /// transition immediately.
    fn on_entry(
        &mut self,
        _state: Self::State,
        _tick: &Tick<'_, Self::Event>,
    ) -> Option<Self::State> {
        None
    }

    /// Runs before leaving `state`.
    fn on_exit(&mut self, _state: Self::State, _tick: &Tick<'_, Self::Event>) {}

    /// Runs once per [`StateMachine::update`](super::StateMachine::update)
    /// while `state` is current.
    fn update(
        &mut self,
        _state: Self::State,
        _tick: &Tick<'_, Self::Event>,
    ) -> Option<Self::State> {
        None
    }
}

/// Errors that can occur while driving a machine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("State '{name}' is not registered")]
    UnknownState { name: String },

    #[error("Entry hooks chained more than {limit} transitions, last requested '{state}'")]
    EntryLoop { state: String, limit: usize },

    #[error("Unrecognized event '{label}'")]
    UnrecognizedEvent { label: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
    enum TestState {
        Start,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            "start"
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Ping;

    impl Event for Ping {
        fn name(&self) -> &str {
            "ping"
        }
    }

    struct Inert;

    impl Controller for Inert {
        type State = TestState;
        type Event = Ping;
    }

    #[test]
    fn default_hooks_request_nothing() {
        let mut controller = Inert;
        let tick = Tick::new(Some(&Ping), Instant::now());

        assert_eq!(controller.on_entry(TestState::Start, &tick), None);
        assert_eq!(controller.update(TestState::Start, &tick), None);
        controller.on_exit(TestState::Start, &tick);
    }

    #[test]
    fn errors_name_the_state() {
        let err = MachineError::UnknownState {
            name: "count_change".to_string(),
        };
        assert_eq!(err.to_string(), "State 'count_change' is not registered");
    }
}
