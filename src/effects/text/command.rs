//! Script commands
//!
//! A script is a `|`-separated list of tokens. A token is either plain text
//! to spell out, or a `#directive` with an optional argument:
//!
//! ```text
//! #countdown 5|Happy|New Year|#time
//! ```

/// Countdown length when the argument is missing or unusable
pub const DEFAULT_COUNTDOWN: u32 = 10;

const TOKEN_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Spell out the text
    Text(String),
    /// Count down from n to 1, one number per second
    Countdown(u32),
    /// Show the wall clock
    Time,
    /// An empty token: a step that shows nothing
    Pause,
    /// A directive nobody understands
    Unknown(String),
}

impl Command {
    pub fn parse(token: &str) -> Self {
        if token.is_empty() {
            return Self::Pause;
        }
        if !token.starts_with('#') {
            return Self::Text(token.to_string());
        }

        let mut parts = token.split(' ');
        let name = parts.next().unwrap_or_default();
        match name {
            "#countdown" => {
                let n = parts
                    .next()
                    .and_then(|v| v.parse::<u32>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_COUNTDOWN);
                Self::Countdown(n)
            }
            "#time" => Self::Time,
            _ => Self::Unknown(name.to_string()),
        }
    }
}

/// Split a script into commands, one per token
pub fn parse_script(script: &str) -> Vec<Command> {
    script.split(TOKEN_SEPARATOR).map(Command::parse).collect()
}

/// Input to `TextAnimation::animate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Parsed and appended to whatever is still pending
    Text(String),
    /// Replaces whatever is still pending
    Commands(Vec<Command>),
}

impl From<&str> for Script {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Script {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Command>> for Script {
    fn from(commands: Vec<Command>) -> Self {
        Self::Commands(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_keeps_spaces() {
        assert_eq!(Command::parse("New Year"), Command::Text("New Year".into()));
    }

    #[test]
    fn test_parse_countdown() {
        assert_eq!(Command::parse("#countdown 3"), Command::Countdown(3));
        assert_eq!(Command::parse("#countdown"), Command::Countdown(10));
        assert_eq!(Command::parse("#countdown 0"), Command::Countdown(10));
        assert_eq!(Command::parse("#countdown soon"), Command::Countdown(10));
        assert_eq!(Command::parse("#countdown -4"), Command::Countdown(10));
    }

    #[test]
    fn test_parse_time_ignores_argument() {
        assert_eq!(Command::parse("#time"), Command::Time);
        assert_eq!(Command::parse("#time now"), Command::Time);
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(Command::parse(""), Command::Pause);
        assert_eq!(Command::parse("#rectangle 4"), Command::Unknown("#rectangle".into()));
    }

    #[test]
    fn test_parse_script_splits_on_pipe() {
        assert_eq!(
            parse_script("#countdown 3|Hello||#time"),
            vec![
                Command::Countdown(3),
                Command::Text("Hello".into()),
                Command::Pause,
                Command::Time,
            ]
        );
    }

    #[test]
    fn test_script_conversions() {
        assert_eq!(Script::from("Hi"), Script::Text("Hi".into()));
        assert_eq!(
            Script::from(vec![Command::Time]),
            Script::Commands(vec![Command::Time])
        );
    }
}
