use crate::chord::ChordMatcher;
use crate::dispatch::{ClipboardSink, Dispatcher};
use crate::mapping::MappingIndex;
use crate::registrar::{self, RegistrationReport};
use crate::sequence::{SequenceMachine, Status, Step};
use crate::types::KeyEvent;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns both recognition paths and feeds them from one serialized event stream.
///
/// Every event goes to the chord matcher first (which may arm the sequence
/// machine through the trigger chord) and then to the sequence machine.
pub struct Engine {
    chords: ChordMatcher,
    machine: Arc<Mutex<SequenceMachine>>,
    dispatcher: Arc<Dispatcher>,
    report: RegistrationReport,
}

impl Engine {
    pub fn new(index: MappingIndex, sink: Arc<dyn ClipboardSink>) -> Self {
        let index = Arc::new(index);
        let dispatcher = Arc::new(Dispatcher::new(index.clone(), sink));
        let machine = Arc::new(Mutex::new(SequenceMachine::new()));
        let mut chords = ChordMatcher::new();
        let report = registrar::register_all(&mut chords, &index, &dispatcher, &machine);
        info!(
            "Engine ready: {} chord(s) registered, {} rejected",
            report.registered, report.failed
        );

        Self {
            chords,
            machine,
            dispatcher,
            report,
        }
    }

    pub fn registration(&self) -> RegistrationReport {
        self.report
    }

    pub fn index(&self) -> &MappingIndex {
        self.dispatcher.index()
    }

    pub fn status(&self) -> Status {
        self.machine.lock().status()
    }

    pub fn process_event(&mut self, event: KeyEvent) -> Step {
        self.chords.on_event(&event);

        let step = self
            .machine
            .lock()
            .on_event(&event, self.dispatcher.index());
        if let Step::Matched { ref path, .. } = step {
            self.dispatcher.deliver(path);
        }
        step
    }

    /// Drains `events` until every sender is dropped.
    pub fn run(&mut self, events: Receiver<KeyEvent>) {
        info!("Engine loop started");
        for event in events.iter() {
            let step = self.process_event(event);
            if step != Step::Ignored {
                debug!("{:?} -> {:?}", event.key, step);
            }
        }
        info!("Event source closed; engine loop exiting");
    }
}
