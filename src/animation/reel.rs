//! Single-reel motion controller
//!
//! A reel runs through `Idle -> Accelerating -> Spinning -> Stopping -> Completed`.
//! Position is the distance scrolled since the spin started, in pixels. It only
//! grows while the reel spins and is never wrapped: the renderer maps it onto
//! the symbol strip.
//!
//! Every operation takes the absolute timeline time. [`ReelController::advance_to`]
//! integrates the motion exactly up to that time and splits at phase
//! boundaries, so the result does not depend on how time was chopped into
//! ticks.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::animation::events::{PhaseObserver, PhaseTransition};
use crate::animation::motion::{align_up, ramp_speed, SettleLeg, StopPlan, RAMP_MS};
use crate::config::speed_preset::{ms_to_secs, SharedPreset, SpeedPreset};
use crate::error::ConfigError;

/// Identity and geometry of one reel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelConfig {
    reel_id: usize,
    symbol_height: f64,
}

impl ReelConfig {
    pub fn new(reel_id: usize, symbol_height: f64) -> Result<Self, ConfigError> {
        if !symbol_height.is_finite() || symbol_height <= 0.0 {
            return Err(ConfigError::InvalidSymbolHeight(symbol_height));
        }
        Ok(Self {
            reel_id,
            symbol_height,
        })
    }

    pub fn reel_id(&self) -> usize {
        self.reel_id
    }

    pub fn symbol_height(&self) -> f64 {
        self.symbol_height
    }
}

/// Lifecycle status of a reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReelStatus {
    #[default]
    Idle,
    Accelerating,
    Spinning,
    Stopping,
    Completed,
}

impl ReelStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ReelStatus::Idle => "Idle",
            ReelStatus::Accelerating => "Accelerating",
            ReelStatus::Spinning => "Spinning",
            ReelStatus::Stopping => "Stopping",
            ReelStatus::Completed => "Completed",
        }
    }

    /// Accelerating or spinning: the states a stop can be requested from
    pub fn is_spinning(&self) -> bool {
        matches!(self, ReelStatus::Accelerating | ReelStatus::Spinning)
    }

    pub fn is_moving(&self) -> bool {
        matches!(
            self,
            ReelStatus::Accelerating | ReelStatus::Spinning | ReelStatus::Stopping
        )
    }
}

impl fmt::Display for ReelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Observable state of a reel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReelMotionState {
    /// Pixels scrolled since the spin started
    pub position: f64,
    /// px/s, meaningful while accelerating or spinning
    pub speed: f64,
    pub status: ReelStatus,
}

/// A reel reached its final aligned position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelCompletion {
    pub reel_id: usize,
    pub position: f64,
    pub at_ms: f64,
}

/// In-flight animation owned by the controller
#[derive(Debug, Clone, Copy)]
enum Motion {
    /// Waiting out the stagger delay
    Armed { starts_at: f64 },
    Accelerating { started_at: f64, cruise: f64 },
    Spinning { cruise: f64 },
    Aligning(StopPlan),
    Settling(SettleLeg),
}

/// Drives one reel through its lifecycle
pub struct ReelController {
    config: ReelConfig,
    preset: Option<SharedPreset>,
    state: ReelMotionState,
    motion: Option<Motion>,
    /// Time the state has been integrated up to
    clock_ms: f64,
    spun_at: Option<f64>,
    stop_requested_at: Option<f64>,
    observer: Option<Arc<dyn PhaseObserver>>,
}

impl ReelController {
    pub fn new(config: ReelConfig) -> Self {
        Self {
            config,
            preset: None,
            state: ReelMotionState::default(),
            motion: None,
            clock_ms: 0.0,
            spun_at: None,
            stop_requested_at: None,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn PhaseObserver>>) {
        self.observer = observer;
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn reel_id(&self) -> usize {
        self.config.reel_id
    }

    pub fn state(&self) -> ReelMotionState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn status(&self) -> ReelStatus {
        self.state.status
    }

    /// Spun but still inside the stagger delay
    pub fn is_armed(&self) -> bool {
        matches!(self.motion, Some(Motion::Armed { .. }))
    }

    /// Time the stagger delay ends, while armed
    pub fn starts_at(&self) -> Option<f64> {
        match self.motion {
            Some(Motion::Armed { starts_at }) => Some(starts_at),
            _ => None,
        }
    }

    pub fn spun_at(&self) -> Option<f64> {
        self.spun_at
    }

    pub fn stop_requested_at(&self) -> Option<f64> {
        self.stop_requested_at
    }

    /// Preset of the current or last spin
    pub fn preset(&self) -> Option<&SharedPreset> {
        self.preset.as_ref()
    }

    /// Start a spin cycle
    ///
    /// The reel waits `reel_id * interval_between_reels` before accelerating.
    /// A preset without spin time completes immediately. Spinning a reel that
    /// is already running cancels the running animation first.
    pub fn spin(&mut self, preset: &SharedPreset, now_ms: f64) -> Option<ReelCompletion> {
        if self.motion.is_some() || self.state.status != ReelStatus::Idle {
            debug!(
                "Reel {} spun while {}, cancelling previous animation",
                self.config.reel_id, self.state.status
            );
            self.cancel(now_ms);
        }

        let (instant, delay) = {
            let preset = preset.read();
            (preset.is_instant(), preset.reel_delay(self.config.reel_id))
        };

        self.preset = Some(Arc::clone(preset));
        self.state = ReelMotionState::default();
        self.clock_ms = now_ms;
        self.spun_at = Some(now_ms);
        self.stop_requested_at = None;

        if instant {
            return self.instant_stop(now_ms);
        }

        debug!(
            "Reel {} spin at {:.1}ms, starts after {:.1}ms",
            self.config.reel_id, now_ms, delay
        );
        self.motion = Some(Motion::Armed {
            starts_at: now_ms + delay,
        });
        self.advance_to(now_ms)
    }

    /// Request a stop on the next alignment line past the safety distance
    ///
    /// Only valid while accelerating or spinning; otherwise a no-op.
    pub fn stop(&mut self, now_ms: f64) -> Option<ReelCompletion> {
        let now_ms = now_ms.max(self.clock_ms);
        if let Some(completion) = self.advance_to(now_ms) {
            return Some(completion);
        }
        if !self.state.status.is_spinning() {
            debug!(
                "Reel {} stop ignored while {}",
                self.config.reel_id, self.state.status
            );
            return None;
        }

        let plan = self.with_preset(|preset| {
            StopPlan::new(
                self.state.position,
                now_ms,
                preset,
                self.config.symbol_height,
            )
        });
        debug!(
            "Reel {} stopping at {:.1}px, aligning to {:.1}px",
            self.config.reel_id, plan.start_position, plan.aligned_target
        );

        self.stop_requested_at = Some(now_ms);
        self.motion = Some(Motion::Aligning(plan));
        self.transition(ReelStatus::Stopping, now_ms);
        self.advance_to(now_ms)
    }

    /// Snap to the next alignment line and complete without animation
    ///
    /// Valid from idle, accelerating or spinning; a no-op once stopping.
    pub fn instant_stop(&mut self, now_ms: f64) -> Option<ReelCompletion> {
        let now_ms = now_ms.max(self.clock_ms);
        if let Some(completion) = self.advance_to(now_ms) {
            return Some(completion);
        }
        match self.state.status {
            ReelStatus::Idle | ReelStatus::Accelerating | ReelStatus::Spinning => {}
            status => {
                debug!(
                    "Reel {} instant stop ignored while {}",
                    self.config.reel_id, status
                );
                return None;
            }
        }

        let target = align_up(self.state.position, self.config.symbol_height);
        self.stop_requested_at = Some(now_ms);
        Some(self.complete(target, now_ms))
    }

    /// Cancel any animation and return to idle at position zero
    pub fn reset(&mut self) {
        self.cancel(self.clock_ms);
        self.state = ReelMotionState::default();
        self.spun_at = None;
        self.stop_requested_at = None;
    }

    /// Integrate the reel up to `now_ms`
    ///
    /// Returns the completion if the reel finished during this step. Times
    /// earlier than the last update are ignored.
    pub fn advance_to(&mut self, now_ms: f64) -> Option<ReelCompletion> {
        if !now_ms.is_finite() {
            return None;
        }
        let symbol_height = self.config.symbol_height;

        while let Some(motion) = self.motion {
            if now_ms < self.clock_ms {
                return None;
            }
            match motion {
                Motion::Armed { starts_at } => {
                    if now_ms < starts_at {
                        self.clock_ms = now_ms;
                        return None;
                    }
                    let cruise = self.with_preset(|preset| preset.cruise_speed(symbol_height));
                    self.clock_ms = starts_at;
                    self.state.speed = 0.0;
                    self.motion = Some(Motion::Accelerating {
                        started_at: starts_at,
                        cruise,
                    });
                    self.transition(ReelStatus::Accelerating, starts_at);
                }
                Motion::Accelerating { started_at, cruise } => {
                    let ramp_end = started_at + RAMP_MS;
                    let until = now_ms.min(ramp_end);
                    self.integrate(ramp_speed(cruise, until - started_at), until);
                    if until < ramp_end {
                        return None;
                    }
                    self.motion = Some(Motion::Spinning { cruise });
                    self.transition(ReelStatus::Spinning, ramp_end);
                }
                Motion::Spinning { cruise } => {
                    self.integrate(cruise, now_ms);
                    return None;
                }
                Motion::Aligning(plan) => {
                    let end = plan.align_end();
                    if now_ms < end {
                        self.move_to(plan.position_at(now_ms), now_ms);
                        return None;
                    }
                    if !plan.settles {
                        return Some(self.complete(plan.align_target, end));
                    }
                    self.move_to(plan.align_target, end);
                    let leg = self.with_preset(|preset| {
                        SettleLeg::new(plan.align_target, end, preset, symbol_height)
                    });
                    self.motion = Some(Motion::Settling(leg));
                }
                Motion::Settling(leg) => {
                    let end = leg.end();
                    if now_ms < end {
                        self.move_to(leg.position_at(now_ms), now_ms);
                        return None;
                    }
                    return Some(self.complete(leg.to, end));
                }
            }
        }
        None
    }

    fn with_preset<T>(&self, f: impl FnOnce(&SpeedPreset) -> T) -> T {
        match &self.preset {
            Some(shared) => f(&shared.read()),
            None => f(&SpeedPreset::default()),
        }
    }

    /// Trapezoidal step to `until`, ending at `end_speed`
    fn integrate(&mut self, end_speed: f64, until: f64) {
        let dt = until - self.clock_ms;
        if dt > 0.0 {
            self.state.position += 0.5 * (self.state.speed + end_speed) * ms_to_secs(dt);
        }
        self.state.speed = end_speed;
        self.clock_ms = self.clock_ms.max(until);
        self.check_position();
    }

    /// Jump to a position on a stop leg
    fn move_to(&mut self, position: f64, at_ms: f64) {
        let dt = at_ms - self.clock_ms;
        if dt > 0.0 {
            self.state.speed = (position - self.state.position) / ms_to_secs(dt);
        }
        self.state.position = position;
        self.clock_ms = self.clock_ms.max(at_ms);
        self.check_position();
    }

    fn complete(&mut self, position: f64, at_ms: f64) -> ReelCompletion {
        self.motion = None;
        self.state.position = position;
        self.state.speed = 0.0;
        self.clock_ms = self.clock_ms.max(at_ms);
        self.check_position();
        self.transition(ReelStatus::Completed, at_ms);
        debug!(
            "Reel {} completed at {:.1}px ({:.1}ms)",
            self.config.reel_id, position, at_ms
        );

        ReelCompletion {
            reel_id: self.config.reel_id,
            position,
            at_ms,
        }
    }

    fn cancel(&mut self, at_ms: f64) {
        self.motion = None;
        self.state.speed = 0.0;
        self.transition(ReelStatus::Idle, at_ms);
    }

    fn transition(&mut self, to: ReelStatus, at_ms: f64) {
        let from = self.state.status;
        if from == to {
            return;
        }
        self.state.status = to;
        debug!(
            "Reel {}: {} -> {} at {:.1}ms",
            self.config.reel_id, from, to, at_ms
        );

        if let Some(observer) = &self.observer {
            observer.on_phase_transition(PhaseTransition {
                reel_id: self.config.reel_id,
                from,
                to,
                at_ms,
            });
        }
    }

    fn check_position(&self) {
        debug_assert!(
            self.state.position.is_finite() && self.state.position >= 0.0,
            "reel {} position went invalid: {}",
            self.config.reel_id,
            self.state.position
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::events::TransitionRecorder;
    use approx::assert_abs_diff_eq;

    const H: f64 = 125.0;

    fn reel(reel_id: usize) -> (ReelController, Arc<TransitionRecorder>) {
        let recorder = Arc::new(TransitionRecorder::new());
        let controller = ReelController::new(ReelConfig::new(reel_id, H).unwrap())
            .with_observer(recorder.clone());
        (controller, recorder)
    }

    fn tick_until(
        reel: &mut ReelController,
        from: f64,
        to: f64,
        dt: f64,
    ) -> Option<ReelCompletion> {
        let mut completion = None;
        let mut t = from;
        while t < to {
            t = (t + dt).min(to);
            if let Some(c) = reel.advance_to(t) {
                completion = Some(c);
            }
        }
        completion
    }

    fn assert_aligned(position: f64) {
        let rem = position.rem_euclid(H);
        assert!(rem < 1e-6 || H - rem < 1e-6, "{position} not aligned");
    }

    #[test]
    fn test_config_validation() {
        assert!(ReelConfig::new(0, 125.0).is_ok());
        assert!(matches!(
            ReelConfig::new(0, 0.0),
            Err(ConfigError::InvalidSymbolHeight(_))
        ));
        assert!(ReelConfig::new(0, -10.0).is_err());
        assert!(ReelConfig::new(0, f64::NAN).is_err());
    }

    #[test]
    fn test_stagger_delay_and_ramp() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, recorder) = reel(2);

        assert!(reel.spin(&preset, 0.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Idle);
        assert!(reel.is_armed());
        assert_eq!(reel.starts_at(), Some(400.0));

        reel.advance_to(399.0);
        assert_eq!(reel.status(), ReelStatus::Idle);
        assert_eq!(reel.position(), 0.0);

        // a coarse tick still stamps the exact boundaries
        reel.advance_to(1000.0);
        assert_eq!(reel.status(), ReelStatus::Spinning);
        assert_eq!(recorder.entered_at(2, ReelStatus::Accelerating), Some(400.0));
        assert_eq!(recorder.entered_at(2, ReelStatus::Spinning), Some(900.0));

        // ramp: 0.5 * 1250 * 0.5s, then 0.1s at cruise
        assert_abs_diff_eq!(reel.position(), 312.5 + 125.0, epsilon = 1e-9);
        assert_eq!(reel.state().speed, 1250.0);
    }

    #[test]
    fn test_position_monotonic_while_spinning() {
        for preset in [SpeedPreset::fast(), SpeedPreset::normal(), SpeedPreset::slow()] {
            let preset = preset.into_shared().unwrap();
            let (mut reel, _) = reel(1);
            reel.spin(&preset, 0.0);

            let mut last = reel.position();
            let mut t = 0.0;
            while t < 4000.0 {
                t += 16.7;
                reel.advance_to(t);
                assert!(reel.status() != ReelStatus::Completed);
                assert!(reel.position() >= last);
                last = reel.position();
            }
        }
    }

    #[test]
    fn test_stop_aligns_and_completes() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, recorder) = reel(0);
        reel.spin(&preset, 0.0);
        tick_until(&mut reel, 0.0, 3000.0, 20.0);

        // 312.5px of ramp plus 2.5s at 1250px/s
        assert_abs_diff_eq!(reel.position(), 3437.5, epsilon = 1e-6);
        assert!(reel.stop(3000.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Stopping);

        let completion = tick_until(&mut reel, 3000.0, 4000.0, 16.0).unwrap();
        // ceil((3437.5 + 375) / 125) * 125
        assert_abs_diff_eq!(completion.position, 3875.0, epsilon = 1e-6);
        assert_abs_diff_eq!(completion.at_ms, 3500.0, epsilon = 1e-9);
        assert_eq!(reel.status(), ReelStatus::Completed);
        assert_eq!(reel.position(), completion.position);
        assert_aligned(reel.position());

        let statuses: Vec<_> = recorder.for_reel(0).iter().map(|t| t.to).collect();
        assert_eq!(
            statuses,
            vec![
                ReelStatus::Accelerating,
                ReelStatus::Spinning,
                ReelStatus::Stopping,
                ReelStatus::Completed
            ]
        );
    }

    #[test]
    fn test_overshoot_then_settle() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(3000.0);
        reel.stop(3000.0);

        // end of the align leg sits past the alignment line
        reel.advance_to(3300.0);
        assert_eq!(reel.status(), ReelStatus::Stopping);
        assert_abs_diff_eq!(reel.position(), 3875.0 + 37.5, epsilon = 1e-6);

        let completion = reel.advance_to(3500.0).unwrap();
        assert_abs_diff_eq!(completion.position, 3875.0, epsilon = 1e-6);
    }

    #[test]
    fn test_alignment_without_overshoot() {
        let preset = SpeedPreset {
            overshoot_symbols: 0.0,
            ..SpeedPreset::fast()
        }
        .into_shared()
        .unwrap();
        let (mut reel, _) = reel(3);
        reel.spin(&preset, 0.0);
        reel.advance_to(1777.0);
        reel.stop(1777.0);

        // no settle leg: done at the end of the align leg
        let completion = reel.advance_to(1977.0).unwrap();
        assert_abs_diff_eq!(completion.at_ms, 1977.0);
        assert_aligned(completion.position);
    }

    #[test]
    fn test_zero_length_legs_complete_synchronously() {
        let preset = SpeedPreset {
            align_duration: 0.0,
            settle_duration: 0.0,
            ..SpeedPreset::normal()
        }
        .into_shared()
        .unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(1000.0);

        let completion = reel.stop(1000.0).unwrap();
        assert_eq!(completion.at_ms, 1000.0);
        assert_aligned(completion.position);
    }

    #[test]
    fn test_stop_is_noop_outside_spin() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, recorder) = reel(1);

        // never spun
        assert!(reel.stop(0.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Idle);

        // armed but still waiting out the delay
        reel.spin(&preset, 0.0);
        assert!(reel.stop(100.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Idle);

        reel.advance_to(1000.0);
        reel.stop(1000.0);
        let target_before = reel.stop_requested_at();
        reel.advance_to(1100.0);
        // already stopping
        assert!(reel.stop(1100.0).is_none());
        assert_eq!(reel.stop_requested_at(), target_before);

        reel.advance_to(2000.0);
        assert_eq!(reel.status(), ReelStatus::Completed);
        assert!(reel.stop(2100.0).is_none());
        assert_eq!(
            recorder
                .for_reel(1)
                .iter()
                .filter(|t| t.to == ReelStatus::Completed)
                .count(),
            1
        );
    }

    #[test]
    fn test_instant_stop() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(800.0);
        let before = reel.position();

        let completion = reel.instant_stop(800.0).unwrap();
        assert!(completion.position >= before);
        assert!(completion.position - before < H);
        assert_aligned(completion.position);
        assert_eq!(reel.status(), ReelStatus::Completed);

        // already completed
        assert!(reel.instant_stop(900.0).is_none());
    }

    #[test]
    fn test_instant_stop_ignored_while_stopping() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.stop(1000.0);
        assert!(reel.instant_stop(1100.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Stopping);
    }

    #[test]
    fn test_instant_stop_while_armed() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(4);
        reel.spin(&preset, 0.0);
        let completion = reel.instant_stop(10.0).unwrap();
        assert_eq!(completion.position, 0.0);
        assert!(!reel.is_armed());

        // the cancelled start never fires
        assert!(reel.advance_to(5000.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Completed);
    }

    #[test]
    fn test_instant_preset_completes_on_spin() {
        let preset = SpeedPreset::instant().into_shared().unwrap();
        let (mut reel, recorder) = reel(3);
        let completion = reel.spin(&preset, 50.0).unwrap();

        assert_eq!(completion.position, 0.0);
        assert_eq!(completion.at_ms, 50.0);
        assert_eq!(reel.status(), ReelStatus::Completed);
        assert_eq!(recorder.for_reel(3).len(), 1);
    }

    #[test]
    fn test_double_spin_restarts_cleanly() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, recorder) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(1000.0);
        reel.stop(1000.0);

        reel.spin(&preset, 1100.0);
        assert_eq!(reel.position(), 0.0);
        assert_eq!(reel.status(), ReelStatus::Accelerating);
        assert_eq!(reel.spun_at(), Some(1100.0));

        // the cancelled stop never completes
        assert!(tick_until(&mut reel, 1100.0, 3000.0, 16.0).is_none());
        assert_eq!(reel.status(), ReelStatus::Spinning);
        assert!(recorder.entered_at(0, ReelStatus::Completed).is_none());
    }

    #[test]
    fn test_reset() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(1500.0);
        reel.reset();

        assert_eq!(reel.state(), ReelMotionState::default());
        assert!(reel.spun_at().is_none());
        assert!(reel.advance_to(5000.0).is_none());
        assert_eq!(reel.position(), 0.0);
    }

    #[test]
    fn test_settle_edit_applies_to_pending_leg() {
        let preset = SpeedPreset::normal().into_shared().unwrap();
        let (mut reel, _) = reel(0);
        reel.spin(&preset, 0.0);
        reel.advance_to(3000.0);
        reel.stop(3000.0);
        reel.advance_to(3100.0);

        // edit while the align leg runs
        preset
            .write()
            .set_duration(crate::config::speed_preset::PresetPhase::Settle, 400.0)
            .unwrap();

        assert!(reel.advance_to(3500.0).is_none());
        let completion = reel.advance_to(3700.0).unwrap();
        assert_eq!(completion.at_ms, 3700.0);
    }

    #[test]
    fn test_tick_partition_does_not_matter() {
        let preset = SpeedPreset::slow().into_shared().unwrap();
        let (mut coarse, _) = reel(1);
        let (mut fine, _) = reel(1);
        coarse.spin(&preset, 0.0);
        fine.spin(&preset, 0.0);

        coarse.advance_to(2345.0);
        tick_until(&mut fine, 0.0, 2345.0, 7.3);
        assert_abs_diff_eq!(coarse.position(), fine.position(), epsilon = 1e-6);

        coarse.stop(2345.0);
        fine.stop(2345.0);
        coarse.advance_to(2600.0);
        tick_until(&mut fine, 2345.0, 2600.0, 3.1);
        assert_abs_diff_eq!(coarse.position(), fine.position(), epsilon = 1e-6);

        let a = coarse.advance_to(10_000.0).unwrap();
        let b = tick_until(&mut fine, 2600.0, 10_000.0, 16.0).unwrap();
        assert_eq!(a.position, b.position);
        assert_eq!(a.at_ms, b.at_ms);
    }
}
