use crate::chord::ChordFacility;
use crate::dispatch::Dispatcher;
use crate::mapping::{Code, MappingIndex};
use crate::sequence::SequenceMachine;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Standing chord that arms the sequence machine.
pub const TRIGGER_CHORD: &str = "ctrl+c";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub registered: usize,
    pub failed: usize,
}

/// Chord trigger for a code, e.g. `ctrl+c+1+a`.
pub fn chord_trigger(code: &Code) -> String {
    format!("{}+{}+{}", TRIGGER_CHORD, code.digit, code.key)
}

/// Binds one chord per indexed code plus the standing trigger chord.
/// Rejected chords are logged and skipped.
pub fn register_all<F: ChordFacility>(
    facility: &mut F,
    index: &MappingIndex,
    dispatcher: &Arc<Dispatcher>,
    machine: &Arc<Mutex<SequenceMachine>>,
) -> RegistrationReport {
    let mut report = RegistrationReport::default();

    for (code, path) in index.iter() {
        let trigger = chord_trigger(code);
        let dispatcher = dispatcher.clone();
        let code = code.clone();
        match facility.register(&trigger, Box::new(move |_| dispatcher.dispatch(&code))) {
            Ok(()) => {
                info!(
                    "Registered simultaneous: {} -> {}",
                    trigger,
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                report.registered += 1;
            }
            Err(e) => {
                warn!("Failed to register {}: {}", trigger, e);
                report.failed += 1;
            }
        }
    }

    let machine = machine.clone();
    match facility.register(TRIGGER_CHORD, Box::new(move |t| machine.lock().arm(t))) {
        Ok(()) => {
            info!("Registered sequential trigger: {}", TRIGGER_CHORD);
            report.registered += 1;
        }
        Err(e) => {
            warn!("Failed to register trigger: {}", e);
            report.failed += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordAction, ChordError};
    use crate::dispatch::ClipboardSink;
    use crate::sequence::Status;
    use std::path::PathBuf;
    use std::time::Instant;

    struct NullSink;

    impl ClipboardSink for NullSink {
        fn set_text(&self, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// Records triggers; rejects anything listed in `reject`.
    #[derive(Default)]
    struct FakeFacility {
        reject: Vec<String>,
        bound: Vec<(String, ChordAction)>,
    }

    impl ChordFacility for FakeFacility {
        fn register(&mut self, trigger: &str, action: ChordAction) -> Result<(), ChordError> {
            if self.reject.iter().any(|r| r == trigger) {
                return Err(ChordError::AlreadyBound(trigger.to_string()));
            }
            self.bound.push((trigger.to_string(), action));
            Ok(())
        }
    }

    fn fixtures() -> (MappingIndex, Arc<Dispatcher>, Arc<Mutex<SequenceMachine>>) {
        let index: MappingIndex = vec![
            (Code::new("1", "a"), PathBuf::from("/s/1/1a.txt")),
            (Code::new("2", "b"), PathBuf::from("/s/2/2b.txt")),
        ]
        .into_iter()
        .collect();
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(index.clone()), Arc::new(NullSink)));
        (index, dispatcher, Arc::new(Mutex::new(SequenceMachine::new())))
    }

    #[test]
    fn test_chord_trigger_format() {
        assert_eq!(chord_trigger(&Code::new("3", "Q")), "ctrl+c+3+q");
    }

    #[test]
    fn test_registers_every_code_and_trigger() {
        let (index, dispatcher, machine) = fixtures();
        let mut facility = FakeFacility::default();
        let report = register_all(&mut facility, &index, &dispatcher, &machine);

        assert_eq!(report, RegistrationReport { registered: 3, failed: 0 });
        let triggers: Vec<&str> = facility.bound.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(triggers, vec!["ctrl+c+1+a", "ctrl+c+2+b", "ctrl+c"]);
    }

    #[test]
    fn test_rejection_does_not_stop_the_rest() {
        let (index, dispatcher, machine) = fixtures();
        let mut facility = FakeFacility {
            reject: vec!["ctrl+c+1+a".to_string()],
            ..Default::default()
        };
        let report = register_all(&mut facility, &index, &dispatcher, &machine);

        assert_eq!(report, RegistrationReport { registered: 2, failed: 1 });
        assert_eq!(facility.bound.len(), 2);
    }

    #[test]
    fn test_trigger_action_arms_machine() {
        let (index, dispatcher, machine) = fixtures();
        let mut facility = FakeFacility::default();
        register_all(&mut facility, &index, &dispatcher, &machine);

        let (_, action) = facility
            .bound
            .iter_mut()
            .find(|(t, _)| t == TRIGGER_CHORD)
            .unwrap();
        assert_eq!(machine.lock().status(), Status::Idle);
        action(Instant::now());
        assert_eq!(machine.lock().status(), Status::WaitDigit);
    }
}
