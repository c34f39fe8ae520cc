//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Clock, State, SystemClock, DEFAULT_HISTORY_LIMIT};
use crate::engine::{Controller, StateMachine};

/// Builder for constructing state machines with a fluent API.
///
/// Unlike [`StateMachine::add_state`], the builder rejects two states with
/// the same name, and `build` enters the initial state so the machine is
/// ready for its first update.
pub struct StateMachineBuilder<C: Controller> {
    controller: C,
    states: Vec<C::State>,
    initial: Option<C::State>,
    clock: Box<dyn Clock>,
    history_limit: usize,
}

impl<C: Controller> StateMachineBuilder<C> {
    /// Create a new builder around `controller`.
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            states: Vec::new(),
            initial: None,
            clock: Box::new(SystemClock),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Register a state.
    pub fn state(mut self, state: C::State) -> Self {
        self.states.push(state);
        self
    }

    /// Register multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = C::State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: C::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Sample time from `clock` instead of the system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Keep at most `limit` transitions in the history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine and enter the initial state.
    pub fn build(self) -> Result<StateMachine<C>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        for (i, state) in self.states.iter().enumerate() {
            if self.states[..i].iter().any(|s| s.name() == state.name()) {
                return Err(BuildError::DuplicateState {
                    name: state.name().to_string(),
                });
            }
        }
        if !self.states.contains(&initial) {
            return Err(BuildError::InitialNotRegistered {
                name: initial.name().to_string(),
            });
        }

        let mut machine = StateMachine::with_boxed_clock(self.controller, self.clock)
            .with_history_limit(self.history_limit);
        machine.add_states(self.states);
        machine.transition_to(initial)?;

        Ok(machine)
    }
}
