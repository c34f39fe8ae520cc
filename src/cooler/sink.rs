//! Valve outputs of the filling station.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Valve actuator of a filling station.
pub trait ValveSink: Send {
    fn open_valve(&mut self);
    fn close_valve(&mut self);

    /// Called on every update while filling. Cosmetic.
    fn progress(&mut self) {}
}

impl<T: ValveSink + ?Sized> ValveSink for Box<T> {
    fn open_valve(&mut self) {
        (**self).open_valve();
    }

    fn close_valve(&mut self) {
        (**self).close_valve();
    }

    fn progress(&mut self) {
        (**self).progress();
    }
}

/// Prints valve changes and a progress dot per update.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleValve;

impl ValveSink for ConsoleValve {
    fn open_valve(&mut self) {
        info!("opening valve");
        println!("opening valve");
    }

    fn close_valve(&mut self) {
        info!("closing valve");
        println!("closing valve");
    }

    fn progress(&mut self) {
        print!(".");
        let _ = std::io::stdout().flush();
    }
}

/// Ignores every command.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullValve;

impl ValveSink for NullValve {
    fn open_valve(&mut self) {}
    fn close_valve(&mut self) {}
}

/// A valve command as observed by [`RecordingValve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValveCommand {
    Open,
    Close,
}

/// Records valve commands; clones share the record.
#[derive(Clone, Debug, Default)]
pub struct RecordingValve {
    commands: Arc<Mutex<Vec<ValveCommand>>>,
}

impl RecordingValve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<ValveCommand> {
        self.lock().clone()
    }

    /// Whether the last command left the valve open.
    pub fn is_open(&self) -> bool {
        self.lock().last() == Some(&ValveCommand::Open)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ValveCommand>> {
        self.commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ValveSink for RecordingValve {
    fn open_valve(&mut self) {
        self.lock().push(ValveCommand::Open);
    }

    fn close_valve(&mut self) {
        self.lock().push(ValveCommand::Close);
    }
}
