//! Command sinks
//!
//! [`CommandSink`] is where encoded commands leave the protocol layer. The UDP
//! [`ControllerLink`](crate::link::ControllerLink) is the real one;
//! [`RecordingSink`] keeps commands in memory for dry runs and tests.

use crate::codec::Command;
use crate::Result;

/// Destination for encoded receiver commands
pub trait CommandSink {
    /// Transmit a single command. Implementations never retry.
    fn send(&mut self, command: Command) -> Result<()>;
}

impl<T: CommandSink + ?Sized> CommandSink for &mut T {
    fn send(&mut self, command: Command) -> Result<()> {
        (**self).send(command)
    }
}

impl<T: CommandSink + ?Sized> CommandSink for Box<T> {
    fn send(&mut self, command: Command) -> Result<()> {
        (**self).send(command)
    }
}

/// Sink that stores every command instead of sending it
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Take the recorded commands, leaving the sink empty
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, command: Command) -> Result<()> {
        tracing::debug!("Recorded command {}", command);
        self.commands.push(command);
        Ok(())
    }
}
