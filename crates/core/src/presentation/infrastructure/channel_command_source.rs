use std::io::BufRead;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::arbiter::command::Command;
use crate::presentation::domain::command_source::CommandSource;

/// Commands delivered over a channel from another thread.
pub struct ChannelCommandSource {
    rx: Receiver<Command>,
}

impl ChannelCommandSource {
    pub fn new(rx: Receiver<Command>) -> Self {
        Self { rx }
    }

    pub fn channel() -> (Sender<Command>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self::new(rx))
    }

    /// Reads one command per line from `reader` on a background thread.
    ///
    /// Unknown lines are logged and ignored. The thread ends at end of input
    /// or once the source is dropped.
    pub fn from_lines<R>(reader: R) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, source) = Self::channel();
        thread::Builder::new()
            .name("command-reader".into())
            .spawn(move || {
                for line in reader.lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            log::warn!("Command input failed: {e}");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => {
                            if tx.send(command).is_err() {
                                break;
                            }
                        }
                        Err(e) => log::warn!("{e}"),
                    }
                }
            })?;
        Ok(source)
    }
}

impl CommandSource for ChannelCommandSource {
    fn poll(&mut self) -> Option<Command> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    #[test]
    fn test_poll_is_non_blocking() {
        let (_tx, mut source) = ChannelCommandSource::channel();
        assert_eq!(source.poll(), None);
    }

    #[test]
    fn test_poll_returns_sent_commands_in_order() {
        let (tx, mut source) = ChannelCommandSource::channel();
        tx.send(Command::TogglePause).unwrap();
        tx.send(Command::Quit).unwrap();
        assert_eq!(source.poll(), Some(Command::TogglePause));
        assert_eq!(source.poll(), Some(Command::Quit));
        assert_eq!(source.poll(), None);
    }

    #[test]
    fn test_from_lines_parses_and_skips_unknown() {
        let input = Cursor::new("p\n\nhello\ns\nq\n");
        let mut source = ChannelCommandSource::from_lines(input).unwrap();

        let mut seen = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(2);
        while seen.len() < 3 && Instant::now() < deadline {
            match source.poll() {
                Some(c) => seen.push(c),
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        assert_eq!(seen, vec![Command::TogglePause, Command::Restart, Command::Quit]);
    }
}
