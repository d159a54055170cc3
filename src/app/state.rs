//! Previewer UI state
//!
//! The event log shown next to the stage: phase transitions drained from the
//! observer channel plus sequencer events, newest last.

use std::collections::VecDeque;

use slotforge::animation::{PhaseTransition, ReelStatus, SequencerEvent};

/// What produced a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Phase(ReelStatus),
    ReelStopped,
    AllStopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at_ms: f64,
    pub kind: LogKind,
    pub text: String,
}

/// Bounded log; the oldest entries fall off
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(200)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push_transition(&mut self, transition: &PhaseTransition) {
        self.push(LogEntry {
            at_ms: transition.at_ms,
            kind: LogKind::Phase(transition.to),
            text: format!(
                "Reel {}: {} -> {}",
                transition.reel_id + 1,
                transition.from,
                transition.to
            ),
        });
    }

    pub fn push_event(&mut self, event: &SequencerEvent) {
        let entry = match *event {
            SequencerEvent::ReelStopped {
                reel_id,
                position,
                at_ms,
            } => LogEntry {
                at_ms,
                kind: LogKind::ReelStopped,
                text: format!("Reel {} stopped at {:.0}px", reel_id + 1, position),
            },
            SequencerEvent::AllStopped { at_ms } => LogEntry {
                at_ms,
                kind: LogKind::AllStopped,
                text: "All reels stopped".to_string(),
            },
        };
        self.push(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push_event(&SequencerEvent::AllStopped {
                at_ms: i as f64,
            });
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().next().unwrap().at_ms, 2.0);
    }

    #[test]
    fn test_entry_text() {
        let mut log = EventLog::default();
        log.push_transition(&PhaseTransition {
            reel_id: 0,
            from: ReelStatus::Spinning,
            to: ReelStatus::Stopping,
            at_ms: 2000.0,
        });
        log.push_event(&SequencerEvent::ReelStopped {
            reel_id: 4,
            position: 3875.0,
            at_ms: 3300.0,
        });

        let texts: Vec<_> = log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Reel 1: Spinning -> Stopping", "Reel 5 stopped at 3875px"]
        );
        assert_eq!(
            log.entries().next().unwrap().kind,
            LogKind::Phase(ReelStatus::Stopping)
        );
    }
}
