use crate::key_names::key_from_name;
use crate::types::{Key, KeyEdge, KeyEvent};
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

/// Callback fired when a chord is recognized; receives the event time.
pub type ChordAction = Box<dyn FnMut(Instant) + Send>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChordError {
    #[error("empty chord trigger")]
    Empty,
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("key '{0}' appears more than once")]
    RepeatedKey(String),
    #[error("chord '{0}' is already bound")]
    AlreadyBound(String),
}

/// Facility that binds a set of simultaneously held keys to a callback.
pub trait ChordFacility {
    fn register(&mut self, trigger: &str, action: ChordAction) -> Result<(), ChordError>;
}

/// A parsed chord trigger: canonical keys, order irrelevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    keys: BTreeSet<KeyId>,
}

/// Orderable wrapper so hotkeys compare as sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct KeyId(u8, u32, &'static str);

impl From<Key> for KeyId {
    fn from(key: Key) -> Self {
        match key.canonical() {
            Key::Char(c) => KeyId(0, c as u32, ""),
            Key::Named(n) => KeyId(1, 0, n),
            Key::Unknown(vk) => KeyId(2, vk as u32, ""),
        }
    }
}

impl Hotkey {
    /// Parses `ctrl+c+1+a` style triggers.
    pub fn parse(trigger: &str) -> Result<Self, ChordError> {
        if trigger.trim().is_empty() {
            return Err(ChordError::Empty);
        }
        let mut keys = BTreeSet::new();
        for part in trigger.split('+') {
            let key = key_from_name(part).ok_or_else(|| ChordError::UnknownKey(part.to_string()))?;
            if !keys.insert(KeyId::from(key)) {
                return Err(ChordError::RepeatedKey(part.trim().to_string()));
            }
        }
        Ok(Self { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn matches(&self, held: &HashSet<KeyId>) -> bool {
        held.len() == self.keys.len() && self.keys.iter().all(|k| held.contains(k))
    }
}

struct Binding {
    trigger: String,
    hotkey: Hotkey,
    action: ChordAction,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("trigger", &self.trigger)
            .field("hotkey", &self.hotkey)
            .finish_non_exhaustive()
    }
}

/// Chord facility driven by the same key-event stream as the sequence machine.
///
/// A binding fires on the key-down that makes the held set equal to its keys.
/// Auto-repeat downs of an already held key do not fire again.
#[derive(Debug, Default)]
pub struct ChordMatcher {
    bindings: Vec<Binding>,
    held: HashSet<KeyId>,
}

impl ChordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Feeds one event; returns the number of bindings fired.
    pub fn on_event(&mut self, event: &KeyEvent) -> usize {
        let id = KeyId::from(event.key);
        match event.edge {
            KeyEdge::Up => {
                self.held.remove(&id);
                0
            }
            KeyEdge::Down => {
                if !self.held.insert(id) {
                    return 0;
                }
                let mut fired = 0;
                for binding in self.bindings.iter_mut() {
                    if binding.hotkey.matches(&self.held) {
                        debug!("Chord matched: {}", binding.trigger);
                        (binding.action)(event.t);
                        fired += 1;
                    }
                }
                fired
            }
        }
    }
}

impl ChordFacility for ChordMatcher {
    fn register(&mut self, trigger: &str, action: ChordAction) -> Result<(), ChordError> {
        let hotkey = Hotkey::parse(trigger)?;
        if self.bindings.iter().any(|b| b.hotkey == hotkey) {
            return Err(ChordError::AlreadyBound(trigger.to_string()));
        }
        self.bindings.push(Binding {
            trigger: trigger.to_string(),
            hotkey,
            action,
        });
        Ok(())
    }
}
