//! Multi-reel sequencer
//!
//! Owns one [`ReelController`] per reel, starts them together (each reel
//! delays itself by its stagger) and stops them together, in a caller-chosen
//! order or on a stop pattern. A completion barrier turns the per-reel
//! completions into a single "all stopped" event per spin cycle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::animation::events::PhaseObserver;
use crate::animation::reel::{ReelCompletion, ReelConfig, ReelController, ReelMotionState};
use crate::config::manifest::StopPattern;
use crate::config::speed_preset::SharedPreset;
use crate::error::ConfigError;

/// Notification produced by [`ReelSequencer::update`] and the batch operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequencerEvent {
    ReelStopped {
        reel_id: usize,
        position: f64,
        at_ms: f64,
    },
    /// Every reel of the current cycle has completed
    AllStopped { at_ms: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledStop {
    reel_id: usize,
    at_ms: f64,
}

pub struct ReelSequencer {
    reels: Vec<ReelController>,
    preset: SharedPreset,
    /// Reels counted by the barrier this cycle
    counted: Vec<bool>,
    completed: usize,
    /// A spin cycle is waiting for its barrier
    cycle_open: bool,
    spun_at: Option<f64>,
    /// Pending stops, sorted by time
    scheduled: Vec<ScheduledStop>,
}

impl ReelSequencer {
    pub fn new(
        reel_count: usize,
        symbol_height: f64,
        preset: SharedPreset,
    ) -> Result<Self, ConfigError> {
        if reel_count == 0 {
            return Err(ConfigError::NoReels);
        }
        preset.read().validate()?;

        let reels = (0..reel_count)
            .map(|reel_id| ReelConfig::new(reel_id, symbol_height).map(ReelController::new))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Sequencer ready: {} reels, symbol height {}px",
            reel_count, symbol_height
        );

        Ok(Self {
            reels,
            preset,
            counted: vec![false; reel_count],
            completed: 0,
            cycle_open: false,
            spun_at: None,
            scheduled: Vec::new(),
        })
    }

    /// Attach the same observer to every reel
    pub fn set_observer(&mut self, observer: Option<Arc<dyn PhaseObserver>>) {
        for reel in &mut self.reels {
            reel.set_observer(observer.clone());
        }
    }

    /// Preset used by the next spin
    pub fn set_preset(&mut self, preset: SharedPreset) {
        self.preset = preset;
    }

    pub fn preset(&self) -> &SharedPreset {
        &self.preset
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn reels(&self) -> &[ReelController] {
        &self.reels
    }

    pub fn reel(&self, reel_id: usize) -> Option<&ReelController> {
        self.reels.get(reel_id)
    }

    pub fn states(&self) -> Vec<ReelMotionState> {
        self.reels.iter().map(ReelController::state).collect()
    }

    pub fn spun_at(&self) -> Option<f64> {
        self.spun_at
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.reels.len()
    }

    /// Time of the pending stop for a reel, if any
    pub fn scheduled_stop(&self, reel_id: usize) -> Option<f64> {
        self.scheduled
            .iter()
            .find(|s| s.reel_id == reel_id)
            .map(|s| s.at_ms)
    }

    /// Spin every reel; opens a new completion cycle
    pub fn spin_all(&mut self, now_ms: f64) -> Vec<SequencerEvent> {
        self.scheduled.clear();
        self.counted.iter_mut().for_each(|c| *c = false);
        self.completed = 0;
        self.cycle_open = true;
        self.spun_at = Some(now_ms);
        debug!("Spin all reels at {:.1}ms", now_ms);

        let preset = self.preset.clone();
        let completions = self
            .reels
            .iter_mut()
            .filter_map(|reel| reel.spin(&preset, now_ms))
            .collect();
        self.finish(completions)
    }

    /// Stop every reel at `now_ms`
    ///
    /// Reels still inside their stagger delay stop as soon as they start.
    pub fn stop_all(&mut self, now_ms: f64) -> Vec<SequencerEvent> {
        let mut completions = self.advance_all(now_ms);
        self.scheduled.clear();

        for reel in &mut self.reels {
            if let Some(starts_at) = reel.starts_at() {
                self.scheduled.push(ScheduledStop {
                    reel_id: reel.reel_id(),
                    at_ms: starts_at,
                });
            } else {
                completions.extend(reel.stop(now_ms));
            }
        }
        self.sort_schedule();
        self.finish(completions)
    }

    /// Stop reels one after another, `interval_ms` apart, in the given order
    ///
    /// The first reel in `order` stops at `now_ms`. Unknown ids are skipped.
    pub fn stop_in_order(
        &mut self,
        order: &[usize],
        interval_ms: f64,
        now_ms: f64,
    ) -> Vec<SequencerEvent> {
        let interval_ms = interval_ms.max(0.0);
        for (k, &reel_id) in order.iter().enumerate() {
            if reel_id < self.reels.len() {
                self.schedule_stop(reel_id, now_ms + k as f64 * interval_ms);
            }
        }
        self.update(now_ms)
    }

    /// Schedule every reel's stop from the preset's spin time and a pattern
    ///
    /// Reel k stops at `spin_at + spin_duration + pattern offset(k)`. Replaces
    /// stops that are still pending.
    pub fn schedule_auto_stops(&mut self, pattern: StopPattern, spin_at: f64) {
        let (spin_duration, interval, instant) = {
            let preset = self.preset.read();
            (
                preset.spin_duration,
                preset.interval_between_reels,
                preset.is_instant(),
            )
        };
        if instant {
            return;
        }

        for reel_id in 0..self.reels.len() {
            let at_ms = spin_at + spin_duration + pattern.stop_offset(reel_id, interval);
            self.schedule_stop(reel_id, at_ms);
        }
        debug!("Auto stops scheduled ({:?}) from {:.1}ms", pattern, spin_at);
    }

    /// Snap every reel to alignment immediately
    pub fn instant_stop_all(&mut self, now_ms: f64) -> Vec<SequencerEvent> {
        let mut completions = self.advance_all(now_ms);
        self.scheduled.clear();
        for reel in &mut self.reels {
            completions.extend(reel.instant_stop(now_ms));
        }
        self.finish(completions)
    }

    /// Return every reel to idle and drop the current cycle
    pub fn reset_all(&mut self) {
        for reel in &mut self.reels {
            reel.reset();
        }
        self.scheduled.clear();
        self.counted.iter_mut().for_each(|c| *c = false);
        self.completed = 0;
        self.cycle_open = false;
        self.spun_at = None;
        debug!("All reels reset");
    }

    /// Advance all reels to `now_ms`, applying scheduled stops at their exact times
    pub fn update(&mut self, now_ms: f64) -> Vec<SequencerEvent> {
        let mut completions = Vec::new();

        while let Some(&next) = self.scheduled.first() {
            if next.at_ms > now_ms {
                break;
            }
            self.scheduled.remove(0);
            completions.extend(self.advance_all(next.at_ms));
            // still inside its stagger delay: stop once it starts
            if let Some(starts_at) = self.reel(next.reel_id).and_then(ReelController::starts_at) {
                self.schedule_stop(next.reel_id, starts_at);
                continue;
            }
            if let Some(reel) = self.reels.get_mut(next.reel_id) {
                completions.extend(reel.stop(next.at_ms));
            }
        }

        completions.extend(self.advance_all(now_ms));
        self.finish(completions)
    }

    fn schedule_stop(&mut self, reel_id: usize, at_ms: f64) {
        self.scheduled.retain(|s| s.reel_id != reel_id);
        self.scheduled.push(ScheduledStop { reel_id, at_ms });
        self.sort_schedule();
    }

    fn sort_schedule(&mut self) {
        self.scheduled
            .sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms).then(a.reel_id.cmp(&b.reel_id)));
    }

    fn advance_all(&mut self, now_ms: f64) -> Vec<ReelCompletion> {
        self.reels
            .iter_mut()
            .filter_map(|reel| reel.advance_to(now_ms))
            .collect()
    }

    /// Count completions and emit events in time order
    fn finish(&mut self, mut completions: Vec<ReelCompletion>) -> Vec<SequencerEvent> {
        completions.sort_by(|a, b| {
            a.at_ms
                .total_cmp(&b.at_ms)
                .then(a.reel_id.cmp(&b.reel_id))
        });

        let mut events = Vec::with_capacity(completions.len() + 1);
        let mut last_at = None;
        for completion in completions {
            let Some(counted) = self.counted.get_mut(completion.reel_id) else {
                continue;
            };
            if *counted {
                continue;
            }
            *counted = true;
            self.completed += 1;
            last_at = Some(completion.at_ms);
            events.push(SequencerEvent::ReelStopped {
                reel_id: completion.reel_id,
                position: completion.position,
                at_ms: completion.at_ms,
            });
        }

        if self.cycle_open && self.completed == self.reels.len() {
            self.cycle_open = false;
            let at_ms = last_at.unwrap_or_default();
            info!("All {} reels stopped at {:.1}ms", self.reels.len(), at_ms);
            events.push(SequencerEvent::AllStopped { at_ms });
        }
        events
    }
}
