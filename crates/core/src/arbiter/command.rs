use std::fmt;
use std::str::FromStr;

/// Operator commands accepted while a session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `q`
    Quit,
    /// `s`: stop the slideshow and forget the current group.
    Restart,
    /// `p`
    TogglePause,
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'q' => Some(Command::Quit),
            's' => Some(Command::Restart),
            'p' => Some(Command::TogglePause),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            Command::Quit => 'q',
            Command::Restart => 's',
            Command::TogglePause => 'p',
        }
    }

    pub fn help() -> [&'static str; 3] {
        [
            "Press 'q' to quit",
            "Press 's' to stop/restart recognition",
            "Press 'p' to pause/resume",
        ]
    }
}

impl FromStr for Command {
    type Err = String;

    /// Reads the first non-blank character of a line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .chars()
            .next()
            .and_then(Command::from_key)
            .ok_or_else(|| format!("unknown command '{}'", s.trim()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Quit => "quit",
            Command::Restart => "restart",
            Command::TogglePause => "pause",
        };
        f.write_str(name)
    }
}
