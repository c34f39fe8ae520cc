//! Event sources and the poll loop that feeds a machine.
//!
//! Blocking on input happens here, outside the machine: a source waits for
//! at most one poll period and reports either an event, nothing, or that it
//! has been closed.

use crate::engine::machine::StateMachine;
use crate::engine::transition::{Controller, MachineError};
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Outcome of a single poll.
#[derive(Clone, Debug, PartialEq)]
pub enum Polled<E> {
    /// An event arrived
    Event(E),
    /// Nothing happened during the poll period
    Idle,
    /// The source will never produce another event
    Closed,
}

/// Producer of zero or one event per poll.
pub trait EventSource<E> {
    fn poll(&mut self) -> Polled<E>;
}

/// Source fed through an `mpsc` channel, typically by an input thread.
pub struct ChannelSource<E> {
    rx: Receiver<E>,
    period: Duration,
}

impl<E> ChannelSource<E> {
    /// Each poll waits up to `period` for an event.
    pub fn new(rx: Receiver<E>, period: Duration) -> Self {
        Self { rx, period }
    }
}

impl<E> EventSource<E> for ChannelSource<E> {
    fn poll(&mut self) -> Polled<E> {
        match self.rx.recv_timeout(self.period) {
            Ok(event) => Polled::Event(event),
            Err(RecvTimeoutError::Timeout) => Polled::Idle,
            Err(RecvTimeoutError::Disconnected) => Polled::Closed,
        }
    }
}

/// Source replaying a fixed script; `None` entries are idle polls.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource<E> {
    script: VecDeque<Option<E>>,
}

impl<E> ScriptedSource<E> {
    pub fn new(script: impl IntoIterator<Item = Option<E>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl<E> EventSource<E> for ScriptedSource<E> {
    fn poll(&mut self) -> Polled<E> {
        match self.script.pop_front() {
            Some(Some(event)) => Polled::Event(event),
            Some(None) => Polled::Idle,
            None => Polled::Closed,
        }
    }
}

/// Poll `source` until it closes, dispatching each event and ticking the
/// machine on idle polls. `after_update` runs after every update.
///
/// Returns the number of updates performed.
pub fn drive<C, S, F>(
    machine: &mut StateMachine<C>,
    source: &mut S,
    mut after_update: F,
) -> Result<usize, MachineError>
where
    C: Controller,
    S: EventSource<C::Event>,
    F: FnMut(&StateMachine<C>),
{
    let mut updates = 0;
    loop {
        match source.poll() {
            Polled::Event(event) => machine.dispatch(event)?,
            Polled::Idle => machine.tick()?,
            Polled::Closed => return Ok(updates),
        };
        updates += 1;
        after_update(machine);
    }
}
