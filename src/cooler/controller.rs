//! Water bottle filling station.
//!
//! The station waits for the optical sensor to see a bottle, opens the valve,
//! and closes it again when the bottle goes away. A fill that runs past the
//! timeout closes the valve and locks the station until the bottle is
//! removed.
//!
//! ```text
//! [waiting ] -- DETECT / open valve ----> [filling ]
//! [filling ] -- UNDETECT / close valve -> [waiting ]
//! [filling ] -- timeout / close valve --> [timedout]
//! [timedout] -- UNDETECT --------------> [waiting ]
//! ```

use super::sink::ValveSink;
use crate::core::Event;
use crate::engine::{Controller, MachineError, Tick};
use crate::state_enum;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Fill timeout used when none is configured.
pub const DEFAULT_FILL_TIMEOUT: Duration = Duration::from_secs(5);

state_enum! {
    /// States of the filling station.
    pub enum CoolerState {
        Waiting => "waiting",
        Filling => "filling",
        TimedOut => "timedout",
    }
}

/// Sensor events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoolerEvent {
    /// The sensor sees a bottle
    Detect,
    /// The bottle is gone
    Undetect,
}

impl CoolerEvent {
    /// Parse a console key or word: `D`/`detect` and `U`/`undetect`, any case.
    pub fn parse(label: &str) -> Result<Self, MachineError> {
        match label.trim().to_ascii_uppercase().as_str() {
            "D" | "DETECT" => Ok(Self::Detect),
            "U" | "UNDETECT" => Ok(Self::Undetect),
            _ => Err(MachineError::UnrecognizedEvent {
                label: label.trim().to_string(),
            }),
        }
    }
}

impl Event for CoolerEvent {
    fn name(&self) -> &str {
        match self {
            Self::Detect => "D",
            Self::Undetect => "U",
        }
    }
}

/// Filling station context: the fill deadline and the valve.
pub struct WaterCooler {
    fill_timeout: Duration,
    stop_time: Option<Instant>,
    valve: Box<dyn ValveSink>,
}

impl WaterCooler {
    pub fn new(fill_timeout: Duration, valve: impl ValveSink + 'static) -> Self {
        Self {
            fill_timeout,
            stop_time: None,
            valve: Box::new(valve),
        }
    }

    pub fn fill_timeout(&self) -> Duration {
        self.fill_timeout
    }

    /// Deadline of the fill in progress.
    pub fn stop_time(&self) -> Option<Instant> {
        self.stop_time
    }

    /// Time left before the fill in progress times out.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.stop_time
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn filling(&mut self, tick: &Tick<'_, CoolerEvent>) -> Option<CoolerState> {
        if tick.event == Some(&CoolerEvent::Undetect) {
            return Some(CoolerState::Waiting);
        }
        if self.stop_time.is_none_or(|deadline| tick.now >= deadline) {
            warn!(timeout = ?self.fill_timeout, "fill timed out");
            return Some(CoolerState::TimedOut);
        }
        self.valve.progress();
        None
    }
}

impl Default for WaterCooler {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_TIMEOUT, super::sink::NullValve)
    }
}

impl Controller for WaterCooler {
    type State = CoolerState;
    type Event = CoolerEvent;

    fn on_entry(&mut self, state: CoolerState, tick: &Tick<'_, CoolerEvent>) -> Option<CoolerState> {
        match state {
            CoolerState::Filling => {
                self.valve.open_valve();
                self.stop_time = Some(tick.now + self.fill_timeout);
                info!(timeout = ?self.fill_timeout, "filling");
            }
            // repeated for an entry that did not come from filling
            CoolerState::TimedOut => self.valve.close_valve(),
            CoolerState::Waiting => {}
        }
        None
    }

    fn on_exit(&mut self, state: CoolerState, _tick: &Tick<'_, CoolerEvent>) {
        if state == CoolerState::Filling {
            self.valve.close_valve();
            self.stop_time = None;
        }
    }

    fn update(&mut self, state: CoolerState, tick: &Tick<'_, CoolerEvent>) -> Option<CoolerState> {
        match (state, tick.event) {
            (CoolerState::Waiting, Some(CoolerEvent::Detect)) => Some(CoolerState::Filling),
            (CoolerState::Filling, _) => self.filling(tick),
            (CoolerState::TimedOut, Some(CoolerEvent::Undetect)) => Some(CoolerState::Waiting),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooler::sink::{RecordingValve, ValveCommand};

    fn cooler() -> (WaterCooler, RecordingValve) {
        let valve = RecordingValve::new();
        (WaterCooler::new(Duration::from_secs(5), valve.clone()), valve)
    }

    #[test]
    fn parse_accepts_keys_and_words() {
        assert_eq!(CoolerEvent::parse("d").unwrap(), CoolerEvent::Detect);
        assert_eq!(CoolerEvent::parse(" U ").unwrap(), CoolerEvent::Undetect);
        assert_eq!(CoolerEvent::parse("Detect").unwrap(), CoolerEvent::Detect);
        assert!(CoolerEvent::parse("x").is_err());
    }

    #[test]
    fn waiting_only_reacts_to_detect() {
        let (mut cooler, _) = cooler();
        let now = Instant::now();
        assert_eq!(
            cooler.update(CoolerState::Waiting, &Tick::new(Some(&CoolerEvent::Undetect), now)),
            None
        );
        assert_eq!(cooler.update(CoolerState::Waiting, &Tick::new(None, now)), None);
        assert_eq!(
            cooler.update(CoolerState::Waiting, &Tick::new(Some(&CoolerEvent::Detect), now)),
            Some(CoolerState::Filling)
        );
    }

    #[test]
    fn filling_entry_opens_valve_and_arms_deadline() {
        let (mut cooler, valve) = cooler();
        let now = Instant::now();
        cooler.on_entry(CoolerState::Filling, &Tick::new(None, now));

        assert!(valve.is_open());
        assert_eq!(cooler.stop_time(), Some(now + Duration::from_secs(5)));
        assert_eq!(cooler.remaining(now), Some(Duration::from_secs(5)));
    }

    #[test]
    fn filling_times_out_at_deadline() {
        let (mut cooler, _) = cooler();
        let now = Instant::now();
        cooler.on_entry(CoolerState::Filling, &Tick::new(None, now));

        let before = now + Duration::from_millis(4999);
        assert_eq!(cooler.update(CoolerState::Filling, &Tick::new(None, before)), None);

        let at = now + Duration::from_secs(5);
        assert_eq!(
            cooler.update(CoolerState::Filling, &Tick::new(None, at)),
            Some(CoolerState::TimedOut)
        );
    }

    #[test]
    fn undetect_beats_timeout() {
        let (mut cooler, _) = cooler();
        let now = Instant::now();
        cooler.on_entry(CoolerState::Filling, &Tick::new(None, now));

        let late = now + Duration::from_secs(60);
        assert_eq!(
            cooler.update(CoolerState::Filling, &Tick::new(Some(&CoolerEvent::Undetect), late)),
            Some(CoolerState::Waiting)
        );
    }

    #[test]
    fn filling_exit_closes_valve_and_clears_deadline() {
        let (mut cooler, valve) = cooler();
        let now = Instant::now();
        cooler.on_entry(CoolerState::Filling, &Tick::new(None, now));
        cooler.on_exit(CoolerState::Filling, &Tick::new(None, now));

        assert!(!valve.is_open());
        assert_eq!(cooler.stop_time(), None);
    }

    #[test]
    fn timed_out_closes_valve_again_and_waits_for_undetect() {
        let (mut cooler, valve) = cooler();
        let now = Instant::now();
        cooler.on_entry(CoolerState::TimedOut, &Tick::new(None, now));
        assert_eq!(valve.commands(), vec![ValveCommand::Close]);

        assert_eq!(
            cooler.update(CoolerState::TimedOut, &Tick::new(Some(&CoolerEvent::Detect), now)),
            None
        );
        assert_eq!(
            cooler.update(CoolerState::TimedOut, &Tick::new(Some(&CoolerEvent::Undetect), now)),
            Some(CoolerState::Waiting)
        );
    }

    #[test]
    fn default_uses_five_second_timeout() {
        assert_eq!(WaterCooler::default().fill_timeout(), DEFAULT_FILL_TIMEOUT);
    }
}
