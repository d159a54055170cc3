//! Phase transition hooks
//!
//! Controllers report every status change to an optional [`PhaseObserver`].
//! Observers are called synchronously from inside the controller update, so
//! they should only record or forward the transition.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::animation::reel::ReelStatus;

/// A reel moved from one status to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTransition {
    pub reel_id: usize,
    pub from: ReelStatus,
    pub to: ReelStatus,
    /// Time of the boundary that caused the change
    pub at_ms: f64,
}

/// Receives phase transitions from reel controllers
pub trait PhaseObserver: Send + Sync {
    fn on_phase_transition(&self, transition: PhaseTransition);
}

/// Keeps every transition it sees
#[derive(Debug, Default)]
pub struct TransitionRecorder {
    transitions: Mutex<Vec<PhaseTransition>>,
}

impl TransitionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn transitions(&self) -> Vec<PhaseTransition> {
        self.transitions.lock().clone()
    }

    /// Drain the recorded transitions
    pub fn take(&self) -> Vec<PhaseTransition> {
        std::mem::take(&mut *self.transitions.lock())
    }

    /// Transitions of a single reel, in order
    pub fn for_reel(&self, reel_id: usize) -> Vec<PhaseTransition> {
        self.transitions
            .lock()
            .iter()
            .filter(|t| t.reel_id == reel_id)
            .copied()
            .collect()
    }

    /// Time a reel first entered `status`
    pub fn entered_at(&self, reel_id: usize, status: ReelStatus) -> Option<f64> {
        self.transitions
            .lock()
            .iter()
            .find(|t| t.reel_id == reel_id && t.to == status)
            .map(|t| t.at_ms)
    }
}

impl PhaseObserver for TransitionRecorder {
    fn on_phase_transition(&self, transition: PhaseTransition) {
        self.transitions.lock().push(transition);
    }
}

/// Forwards transitions to a channel, e.g. for a UI thread to drain
pub struct ChannelObserver {
    tx: Sender<PhaseTransition>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<PhaseTransition>) -> Self {
        Self { tx }
    }

    /// Observer plus the receiving end of an unbounded channel
    pub fn channel() -> (Self, Receiver<PhaseTransition>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }
}

impl PhaseObserver for ChannelObserver {
    fn on_phase_transition(&self, transition: PhaseTransition) {
        // receiver gone: nobody is listening any more
        let _ = self.tx.send(transition);
    }
}
