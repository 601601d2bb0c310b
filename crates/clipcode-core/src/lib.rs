pub mod chord;
pub mod dispatch;
pub mod engine;
pub mod key_names;
pub mod key_state;
pub mod mapping;
pub mod registrar;
pub mod sequence;
pub mod types;

#[cfg(windows)]
pub mod clipboard;
#[cfg(windows)]
pub mod keyboard_hook;

pub use chord::{ChordAction, ChordError, ChordFacility, ChordMatcher, Hotkey};
pub use dispatch::{ClipboardSink, DispatchError, Dispatcher};
pub use engine::Engine;
pub use key_state::HeldKeys;
pub use mapping::{Code, MappingIndex};
pub use sequence::{SequenceMachine, Status, Step, SEQUENCE_TIMEOUT};
pub use types::{Key, KeyEdge, KeyEvent};
