//! Remote control via Unix socket
//!
//! Accepts one command per line over a Unix socket, the same things the
//! keyboard and mouse can do plus `animate <script>`:
//!
//! ```text
//! echo "launch 400 200" | nc -U /tmp/sparkmorph.sock
//! echo "animate #countdown 5|Go" | nc -U /tmp/sparkmorph.sock
//! ```

use crate::error::FxError;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const SOCKET_PATH: &str = "/tmp/sparkmorph.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    ToggleFireworks,
    StartFireworks,
    StopFireworks,
    /// Launch a rocket toward this point, in window coordinates
    Launch(i32, i32),
    AutoFireworks,
    /// Script for the text animation
    Animate(String),
    ToggleFps,
    Quit,
}

impl RemoteCommand {
    /// Parse one line. Keywords are case-insensitive; the script after
    /// `animate` is passed through as typed.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "toggle" | "space" => Some(Self::ToggleFireworks),
            "start" => Some(Self::StartFireworks),
            "stop" => Some(Self::StopFireworks),
            "auto" | "a" => Some(Self::AutoFireworks),
            "fps" | "f" => Some(Self::ToggleFps),
            "quit" | "q" | "exit" => Some(Self::Quit),
            "launch" => {
                let mut coords = rest.split_whitespace().map(str::parse::<i32>);
                match (coords.next(), coords.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => Some(Self::Launch(x, y)),
                    _ => None,
                }
            }
            "animate" if !rest.is_empty() => Some(Self::Animate(rest.to_string())),
            _ => None,
        }
    }
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    path: PathBuf,
    receiver: Receiver<RemoteCommand>,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Bind the socket, replacing a stale one left by an earlier run
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FxError> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)?;
        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender);
        });

        log::info!("control socket listening on {}", path.display());
        Ok(Self {
            path,
            receiver,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<RemoteCommand>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    log::warn!("control socket closed: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<RemoteCommand>) {
        // Accepted streams inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            log::warn!("control client: {}", e);
            return;
        }
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match RemoteCommand::parse(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => log::warn!("unknown control command: {}", line.trim()),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<RemoteCommand> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(RemoteCommand::parse("toggle"), Some(RemoteCommand::ToggleFireworks));
        assert_eq!(RemoteCommand::parse(" START "), Some(RemoteCommand::StartFireworks));
        assert_eq!(RemoteCommand::parse("stop"), Some(RemoteCommand::StopFireworks));
        assert_eq!(RemoteCommand::parse("auto"), Some(RemoteCommand::AutoFireworks));
        assert_eq!(RemoteCommand::parse("fps"), Some(RemoteCommand::ToggleFps));
        assert_eq!(RemoteCommand::parse("quit"), Some(RemoteCommand::Quit));
        assert_eq!(RemoteCommand::parse("dance"), None);
    }

    #[test]
    fn test_parse_launch() {
        assert_eq!(RemoteCommand::parse("launch 400 -20"), Some(RemoteCommand::Launch(400, -20)));
        assert_eq!(RemoteCommand::parse("launch 400"), None);
        assert_eq!(RemoteCommand::parse("launch x y"), None);
    }

    #[test]
    fn test_parse_animate_keeps_script() {
        assert_eq!(
            RemoteCommand::parse("animate #countdown 5|Happy New Year"),
            Some(RemoteCommand::Animate("#countdown 5|Happy New Year".into()))
        );
        assert_eq!(RemoteCommand::parse("animate"), None);
    }

    #[test]
    fn test_socket_delivers_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.sock");
        let controller = Controller::new(&path).unwrap();

        let mut client = UnixStream::connect(&path).unwrap();
        writeln!(client, "launch 10 20").unwrap();
        writeln!(client, "bogus").unwrap();
        writeln!(client, "quit").unwrap();
        drop(client);

        let mut received = Vec::new();
        for _ in 0..100 {
            received.extend(controller.poll());
            if received.len() == 2 {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(received, vec![RemoteCommand::Launch(10, 20), RemoteCommand::Quit]);

        drop(controller);
        assert!(!path.exists());
    }
}
