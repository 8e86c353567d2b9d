use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Input consumed by the session loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// The input stream ended
    Closed,
}

/// Source of user input
pub trait InputSource {
    /// Block for up to `timeout` waiting for input.
    /// Returns Err(Timeout) if nothing arrived in time.
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError>;
}

/// Reads stdin lines on a helper thread
pub struct StdinSource {
    rx: Receiver<InputEvent>,
}

impl StdinSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(InputEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = tx.send(InputEvent::Closed);
        });

        Self { rx }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Never produces input; used for unattended runs
pub struct IdleSource;

impl InputSource for IdleSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        std::thread::sleep(timeout);
        Err(RecvTimeoutError::Timeout)
    }
}

/// Waits for input until the next session deadline or the tick interval,
/// whichever comes first
pub struct Runner<I: InputSource> {
    input: I,
    tick: Duration,
}

impl<I: InputSource> Runner<I> {
    pub fn new(input: I, tick: Duration) -> Self {
        Self { input, tick }
    }

    /// Returns the input that arrived, or None when the wait timed out
    pub fn step(&self, deadline: Option<Instant>) -> Option<InputEvent> {
        let timeout = match deadline {
            Some(at) => at.saturating_duration_since(Instant::now()).min(self.tick),
            None => self.tick,
        };

        match self.input.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(InputEvent::Closed),
        }
    }
}
