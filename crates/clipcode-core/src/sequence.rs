use crate::mapping::{Code, MappingIndex};
use crate::types::{Key, KeyEdge, KeyEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Maximum gap between the trigger and the digit, or the digit and the character.
pub const SEQUENCE_TIMEOUT: Duration = Duration::from_secs(3);

/// The key that forms the trigger chord together with ctrl.
pub const TRIGGER_KEY: Key = Key::Char('c');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    WaitDigit,
    WaitChar,
}

/// Outcome of feeding one event to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed (key-up, idle, or chord noise).
    Ignored,
    /// A digit was accepted; waiting for the character.
    Advanced,
    /// The pending sequence was abandoned.
    Reset,
    /// The sequence resolved to an indexed file.
    Matched { code: Code, path: PathBuf },
    /// The sequence completed but no file carries that code.
    Missed(Code),
}

/// Recognizes `trigger, digit, char` across separate key-down events.
///
/// Expiry is evaluated lazily when the next key-down arrives; an abandoned
/// sequence keeps its status until then.
#[derive(Debug)]
pub struct SequenceMachine {
    status: Status,
    digit: Option<char>,
    last: Option<Instant>,
}

impl Default for SequenceMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceMachine {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
            digit: None,
            last: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pending_digit(&self) -> Option<char> {
        self.digit
    }

    /// Whether a pending sequence has outlived the timeout at `now`.
    /// Read-only: the status is not touched.
    pub fn is_expired(&self, now: Instant) -> bool {
        match (self.status, self.last) {
            (Status::Idle, _) | (_, None) => false,
            (_, Some(last)) => now.saturating_duration_since(last) > SEQUENCE_TIMEOUT,
        }
    }

    /// Entered from the trigger chord; the only way into `WaitDigit`.
    pub fn arm(&mut self, now: Instant) {
        self.status = Status::WaitDigit;
        self.digit = None;
        self.last = Some(now);
        info!("Trigger detected. Waiting for digit...");
    }

    fn reset(&mut self) {
        self.status = Status::Idle;
        self.digit = None;
    }

    pub fn on_event(&mut self, event: &KeyEvent, index: &MappingIndex) -> Step {
        if event.edge == KeyEdge::Up {
            return Step::Ignored;
        }

        if self.is_expired(event.t) {
            info!("Timeout. Resetting sequence.");
            self.reset();
        }

        match self.status {
            Status::Idle => Step::Ignored,
            Status::WaitDigit => self.on_wait_digit(event),
            Status::WaitChar => self.on_wait_char(event, index),
        }
    }

    fn on_wait_digit(&mut self, event: &KeyEvent) -> Step {
        // Still holding or repeating the trigger chord.
        if event.key.is_ctrl() || event.key.canonical() == TRIGGER_KEY {
            return Step::Ignored;
        }

        match event.key.digit() {
            Some(d) => {
                self.digit = Some(d);
                self.status = Status::WaitChar;
                self.last = Some(event.t);
                info!("Digit '{}' received. Waiting for char...", d);
                Step::Advanced
            }
            None => {
                info!("Invalid input '{}'. Resetting.", event.key.name());
                self.reset();
                Step::Reset
            }
        }
    }

    fn on_wait_char(&mut self, event: &KeyEvent, index: &MappingIndex) -> Step {
        if event.key.is_ctrl() {
            return Step::Ignored;
        }

        let (Key::Char(c), Some(digit)) = (event.key, self.digit) else {
            info!("Invalid char '{}'. Resetting.", event.key.name());
            self.reset();
            return Step::Reset;
        };

        let code = Code::from_chars(digit, c);
        self.reset();
        match index.get(&code) {
            Some(path) => {
                info!("Sequence complete: {}", code);
                Step::Matched {
                    code,
                    path: path.to_path_buf(),
                }
            }
            None => {
                debug!("No match for sequence: {}", code);
                Step::Missed(code)
            }
        }
    }
}
