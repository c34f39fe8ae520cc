//! State machine engine driving a [`Controller`].

use crate::core::{Clock, Event, State, StateHistory, StateTransition, SystemClock};
use crate::engine::transition::{Controller, MachineError, Tick};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Upper bound on transitions requested back to back by entry hooks.
pub const MAX_ENTRY_CHAIN: usize = 16;

/// State machine that owns a controller, its registered states and the
/// pending event slot.
///
/// The machine has no current state until [`go_to_state`](Self::go_to_state)
/// or [`transition_to`](Self::transition_to) is called; until then
/// [`update`](Self::update) does nothing.
///
/// `update` consumes the pending event. Calling it twice without a new event
/// runs the second update with no event rather than replaying the first.
pub struct StateMachine<C: Controller> {
    id: Uuid,
    controller: C,
    states: HashMap<String, C::State>,
    current: Option<C::State>,
    event: Option<C::Event>,
    history: StateHistory<C::State>,
    clock: Box<dyn Clock>,
}

impl<C: Controller> StateMachine<C> {
    /// Create a machine with no registered states, backed by the system clock.
    pub fn new(controller: C) -> Self {
        Self::with_clock(controller, SystemClock)
    }

    /// Create a machine sampling time from `clock`.
    pub fn with_clock(controller: C, clock: impl Clock + 'static) -> Self {
        Self::with_boxed_clock(controller, Box::new(clock))
    }

    pub(crate) fn with_boxed_clock(controller: C, clock: Box<dyn Clock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            controller,
            states: HashMap::new(),
            current: None,
            event: None,
            history: StateHistory::new(),
            clock,
        }
    }

    /// Replace the history with an empty one holding at most `limit` records.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = StateHistory::with_limit(limit);
        self
    }

    /// Register a state under its name.
    ///
    /// A state already registered under the same name is replaced and returned.
    pub fn add_state(&mut self, state: C::State) -> Option<C::State> {
        let previous = self.states.insert(state.name().to_string(), state);
        if let Some(previous) = &previous {
            warn!(machine = %self.id, state = previous.name(), "replacing registered state");
        }
        previous
    }

    /// Register every state yielded by `states`.
    pub fn add_states(&mut self, states: impl IntoIterator<Item = C::State>) {
        for state in states {
            self.add_state(state);
        }
    }

    /// Transition to the state registered as `name`.
    ///
    /// Runs the current state's exit hook (if any), then the target's entry
    /// hook. A state may transition to itself, which re-runs both hooks.
    pub fn go_to_state(&mut self, name: &str) -> Result<(), MachineError> {
        let target = self
            .states
            .get(name)
            .copied()
            .ok_or_else(|| MachineError::UnknownState {
                name: name.to_string(),
            })?;
        self.transition_to(target)
    }

    /// Transition to `state`, which must be registered.
    pub fn transition_to(&mut self, state: C::State) -> Result<(), MachineError> {
        let event = self.event.clone();
        let now = self.clock.now();
        self.enter(state, event.as_ref(), now)
    }

    /// Store the event the next [`update`](Self::update) will see.
    pub fn set_event(&mut self, event: Option<C::Event>) {
        self.event = event;
    }

    /// Run the current state's update hook once.
    ///
    /// Performs at most one transition requested by the update hook (plus any
    /// transitions chained by entry hooks). Returns the state entered, or
    /// `None` when the machine stayed put or has no current state.
    pub fn update(&mut self) -> Result<Option<C::State>, MachineError> {
        let Some(current) = self.current else {
            return Ok(None);
        };
        let event = self.event.take();
        let now = self.clock.now();

        if let Some(event) = &event {
            trace!(machine = %self.id, state = current.name(), event = event.name(), "update");
        }

        let tick = Tick::new(event.as_ref(), now);
        match self.controller.update(current, &tick) {
            Some(next) => {
                self.enter(next, event.as_ref(), now)?;
                Ok(self.current)
            }
            None => Ok(None),
        }
    }

    /// Store `event` and run one update.
    pub fn dispatch(&mut self, event: C::Event) -> Result<Option<C::State>, MachineError> {
        self.set_event(Some(event));
        self.update()
    }

    /// Run one update with no event, letting time-based transitions fire.
    pub fn tick(&mut self) -> Result<Option<C::State>, MachineError> {
        self.set_event(None);
        self.update()
    }

    fn enter(
        &mut self,
        target: C::State,
        event: Option<&C::Event>,
        now: Instant,
    ) -> Result<(), MachineError> {
        let tick = Tick::new(event, now);
        let mut next = target;

        for _ in 0..MAX_ENTRY_CHAIN {
            self.ensure_registered(&next)?;

            let from = self.current;
            if let Some(current) = from {
                debug!(machine = %self.id, state = current.name(), "exiting");
                self.controller.on_exit(current, &tick);
            }

            self.current = Some(next);
            self.history.record(StateTransition {
                from,
                to: next,
                trigger: event.map(|e| e.name().to_string()),
                timestamp: Utc::now(),
            });
            debug!(machine = %self.id, state = next.name(), "entering");

            match self.controller.on_entry(next, &tick) {
                Some(requested) => next = requested,
                None => return Ok(()),
            }
        }

        Err(MachineError::EntryLoop {
            state: next.name().to_string(),
            limit: MAX_ENTRY_CHAIN,
        })
    }

    fn ensure_registered(&self, state: &C::State) -> Result<(), MachineError> {
        match self.states.get(state.name()) {
            Some(registered) if registered == state => Ok(()),
            _ => Err(MachineError::UnknownState {
                name: state.name().to_string(),
            }),
        }
    }

    /// Current state (`None` before the first transition).
    pub fn current_state(&self) -> Option<&C::State> {
        self.current.as_ref()
    }

    /// Name of the current state.
    pub fn state_name(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.name())
    }

    /// Event waiting for the next update.
    pub fn pending_event(&self) -> Option<&C::Event> {
        self.event.as_ref()
    }

    /// Whether a state is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Names of all registered states, in no particular order.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn history(&self) -> &StateHistory<C::State> {
        &self.history
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}
