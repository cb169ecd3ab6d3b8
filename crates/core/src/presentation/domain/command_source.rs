use crate::arbiter::command::Command;

/// Non-blocking source of operator commands.
pub trait CommandSource: Send {
    /// Next pending command, if any. Never blocks.
    fn poll(&mut self) -> Option<Command>;
}
